use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

use crate::format::format_date_display;

#[derive(Clone, Copy, PartialEq)]
pub enum DatePart {
    Day,
    Month,
    Year,
}

/// Segmented date editor, day/month/year order. Digits are collected per
/// part and applied once the part is complete and in range.
pub struct DateInputState {
    pub date: NaiveDate,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Day,
            current_date_input: String::new(),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Day;
            self.current_date_input.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Day => DatePart::Month,
            DatePart::Month => DatePart::Year,
            DatePart::Year => DatePart::Day,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Day => DatePart::Year,
            DatePart::Month => DatePart::Day,
            DatePart::Year => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let year = self.date.year();
                let month = self.date.month();
                let day = self.date.day();

                match self.date_part {
                    DatePart::Day => {
                        self.current_date_input.push(c);
                        if self.current_date_input.len() == 2 {
                            if let Ok(new_day) = self.current_date_input.parse::<u32>() {
                                let max_day = days_in_month(year, month);
                                if new_day >= 1 && new_day <= max_day {
                                    if let Some(new_date) =
                                        NaiveDate::from_ymd_opt(year, month, new_day)
                                    {
                                        self.date = new_date;
                                    }
                                }
                            }
                            self.current_date_input.clear();
                        }
                    }
                    DatePart::Month => {
                        self.current_date_input.push(c);
                        if self.current_date_input.len() == 2 {
                            if let Ok(new_month) = self.current_date_input.parse::<u32>() {
                                if new_month >= 1 && new_month <= 12 {
                                    // Clamp the day so 31/01 -> month 02 stays valid
                                    let new_day = day.min(days_in_month(year, new_month));
                                    if let Some(new_date) =
                                        NaiveDate::from_ymd_opt(year, new_month, new_day)
                                    {
                                        self.date = new_date;
                                    }
                                }
                            }
                            self.current_date_input.clear();
                        }
                    }
                    DatePart::Year => {
                        self.current_date_input.push(c);
                        if self.current_date_input.len() == 4 {
                            if let Ok(new_year) = self.current_date_input.parse::<i32>() {
                                if new_year >= 1900 && new_year <= 2100 {
                                    let new_day = day.min(days_in_month(new_year, month));
                                    if let Some(new_date) =
                                        NaiveDate::from_ymd_opt(new_year, month, new_day)
                                    {
                                        self.date = new_date;
                                    }
                                }
                            }
                            self.current_date_input.clear();
                        }
                    }
                }
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        if !self.editing {
            return format_date_display(self.date);
        }

        let day = format!("{:02}", self.date.day());
        let month = format!("{:02}", self.date.month());
        let year = format!("{:04}", self.date.year());

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Day => "[DD]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Year => "[YYYY]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Day => format!("{}{}/{}/{}", day, current_input, month, year),
            DatePart::Month => format!("{}/{}{}/{}", day, month, current_input, year),
            DatePart::Year => format!("{}/{}/{}{}", day, month, year, current_input),
        }
    }
}

// Helper function to get the number of days in a month
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DateInputState {
        let mut s = DateInputState::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        s.toggle_editing();
        s
    }

    #[test]
    fn two_digits_set_the_day() {
        let mut s = state();
        s.handle_input(KeyCode::Char('0'));
        s.handle_input(KeyCode::Char('7'));
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
    }

    #[test]
    fn out_of_range_day_is_ignored() {
        let mut s = state();
        s.handle_input(KeyCode::Char('3'));
        s.handle_input(KeyCode::Char('2'));
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn changing_month_clamps_the_day() {
        let mut s = DateInputState::new(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        s.toggle_editing();
        s.next_date_part();
        s.handle_input(KeyCode::Char('0'));
        s.handle_input(KeyCode::Char('2'));
        assert_eq!(s.date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn display_is_day_first() {
        let s = DateInputState::new(NaiveDate::from_ymd_opt(2024, 6, 7).unwrap());
        assert_eq!(s.get_display_string(), "07/06/2024");
    }
}
