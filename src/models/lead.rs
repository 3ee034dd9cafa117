use chrono::NaiveDate;

use crate::format::{format_date_short, format_phone};

/// Qualification status of a lead, using the spreadsheet's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeadStatus {
    #[default]
    Novo,
    EmNegociacao,
    Qualificado,
    NaoQualificado,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::Novo,
        LeadStatus::EmNegociacao,
        LeadStatus::Qualificado,
        LeadStatus::NaoQualificado,
    ];

    /// Label as it appears in the status column and the select widget.
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::Novo => "Novo",
            LeadStatus::EmNegociacao => "Em negociação",
            LeadStatus::Qualificado => "Qualificado",
            LeadStatus::NaoQualificado => "Não qualificado",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.label() == label)
    }
}

/// A single lead intake destined for the lead sheet tab.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeadRecord {
    pub name: String,
    pub phone: String,
    pub social: String,
    pub interest: String,
    pub status: LeadStatus,
    pub reminder_date: Option<NaiveDate>,
    pub reminder_reason: String,
    pub notes: String,
}

impl LeadRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten into spreadsheet columns, in sheet header order.
    pub fn columns(&self) -> Vec<(&'static str, String)> {
        vec![
            ("nome", self.name.trim().to_string()),
            ("telefone", format_phone(&self.phone)),
            ("rede_social", self.social.trim().to_string()),
            ("interesse", self.interest.trim().to_string()),
            ("status", self.status.label().to_string()),
            (
                "data_lembrete",
                self.reminder_date.map(format_date_short).unwrap_or_default(),
            ),
            ("motivo_lembrete", self.reminder_reason.trim().to_string()),
            ("observacoes", self.notes.trim().to_string()),
        ]
    }
}
