use chrono::{Local, NaiveDate};

use crate::format::{format_date_short, format_phone};

/// A single client intake destined for the client sheet tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientRecord {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub product: String,
    pub order_date: NaiveDate,
    pub notes: String,
}

impl ClientRecord {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            product: String::new(),
            order_date: Local::now().date_naive(),
            notes: String::new(),
        }
    }

    /// Flatten into spreadsheet columns, in sheet header order.
    pub fn columns(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nome", self.name.trim().to_string()),
            ("telefone", format_phone(&self.phone)),
            ("endereco", self.address.trim().to_string()),
            ("cidade", self.city.trim().to_string()),
            ("produto", self.product.trim().to_string()),
            ("data_pedido", format_date_short(self.order_date)),
            ("observacoes", self.notes.trim().to_string()),
        ]
    }
}

impl Default for ClientRecord {
    fn default() -> Self {
        Self::new()
    }
}
