/// Fixed-option selector cycled with the arrow keys. The widget can only
/// ever produce one of its options, so enum fields stay valid by
/// construction.
pub struct SelectInputState {
    options: Vec<&'static str>,
    pub selected: usize,
}

impl SelectInputState {
    pub fn new(options: Vec<&'static str>) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub fn previous(&mut self) {
        self.selected = if self.selected == 0 {
            self.options.len() - 1
        } else {
            self.selected - 1
        };
    }

    pub fn current(&self) -> &'static str {
        self.options[self.selected]
    }

    pub fn get_display_string(&self) -> String {
        format!("< {} >", self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_both_directions() {
        let mut s = SelectInputState::new(vec!["a", "b", "c"]);
        assert_eq!(s.current(), "a");
        s.next();
        assert_eq!(s.current(), "b");
        s.previous();
        s.previous();
        assert_eq!(s.current(), "c");
    }
}
