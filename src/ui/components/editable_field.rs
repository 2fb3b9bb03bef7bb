use crossterm::event::KeyCode;

// What a field accepts from the keyboard
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FieldKind {
    Text,
    Amount,
    Count,
}

/// Inline text field that shows placeholder text while empty and unfocused.
pub struct EditableField {
    pub value: String,
    pub placeholder: &'static str,
    pub kind: FieldKind,
    pub focused: bool,
}

impl EditableField {
    pub fn new(placeholder: &'static str, kind: FieldKind, value: Option<String>) -> Self {
        Self {
            value: value.unwrap_or_default(),
            placeholder,
            kind,
            focused: false,
        }
    }

    pub fn focus(&mut self) {
        self.focused = true;
        if self.value == self.placeholder {
            self.value.clear();
        }
    }

    /// Leave the field. Returns true when the placeholder comes back.
    pub fn blur(&mut self) -> bool {
        self.focused = false;
        self.value.is_empty()
    }

    /// Feed a key press to the field. Returns true if the value changed.
    pub fn handle_input(&mut self, key: KeyCode) -> bool {
        if !self.focused {
            return false;
        }
        let accepted = match self.kind {
            FieldKind::Text => true,
            FieldKind::Amount => accepts_amount_key(&self.value, key),
            FieldKind::Count => matches!(key, KeyCode::Char(c) if c.is_ascii_digit())
                || key == KeyCode::Backspace,
        };
        if !accepted {
            return false;
        }

        match key {
            KeyCode::Char(c) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => self.value.pop().is_some(),
            _ => false,
        }
    }

    pub fn get_display_string(&self) -> String {
        if self.focused {
            format!("{}|", self.value)
        } else if self.value.is_empty() {
            self.placeholder.to_string()
        } else {
            self.value.clone()
        }
    }
}

/// Keystroke filter for price and discount fields: digits, one decimal
/// point, backspace and the left/right arrows.
pub fn accepts_amount_key(current: &str, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('.') => !current.contains('.'),
        KeyCode::Char(c) => c.is_ascii_digit(),
        KeyCode::Backspace | KeyCode::Left | KeyCode::Right => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_shows_only_when_empty_and_unfocused() {
        let mut field = EditableField::new("item name", FieldKind::Text, None);
        assert_eq!(field.get_display_string(), "item name");

        field.focus();
        assert_eq!(field.get_display_string(), "|");

        field.handle_input(KeyCode::Char('x'));
        assert!(!field.blur());
        assert_eq!(field.get_display_string(), "x");

        field.focus();
        field.handle_input(KeyCode::Backspace);
        assert!(field.blur());
        assert_eq!(field.get_display_string(), "item name");
    }

    #[test]
    fn focusing_clears_placeholder_text() {
        let mut field =
            EditableField::new("item price", FieldKind::Amount, Some("item price".into()));
        field.focus();
        assert!(field.value.is_empty());
    }

    #[test]
    fn amount_fields_filter_keys() {
        let mut field = EditableField::new("item price", FieldKind::Amount, None);
        field.focus();

        for c in "1a2.5.x".chars() {
            field.handle_input(KeyCode::Char(c));
        }
        assert_eq!(field.value, "12.5");
        assert!(!field.handle_input(KeyCode::Left));
        assert!(!field.handle_input(KeyCode::Char('-')));
    }

    #[test]
    fn count_fields_take_digits_only() {
        let mut field = EditableField::new("1", FieldKind::Count, None);
        field.focus();

        for c in "1.2-x3".chars() {
            field.handle_input(KeyCode::Char(c));
        }
        assert_eq!(field.value, "123");
        assert!(field.handle_input(KeyCode::Backspace));
        assert_eq!(field.value, "12");
    }

    #[test]
    fn amount_filter_rules() {
        assert!(accepts_amount_key("", KeyCode::Char('7')));
        assert!(accepts_amount_key("3", KeyCode::Char('.')));
        assert!(!accepts_amount_key("3.1", KeyCode::Char('.')));
        assert!(!accepts_amount_key("", KeyCode::Char('e')));
        assert!(accepts_amount_key("", KeyCode::Backspace));
        assert!(accepts_amount_key("", KeyCode::Right));
        assert!(!accepts_amount_key("", KeyCode::Tab));
    }

    #[test]
    fn unfocused_field_ignores_keys() {
        let mut field = EditableField::new("item name", FieldKind::Text, None);
        assert!(!field.handle_input(KeyCode::Char('a')));
        assert!(field.value.is_empty());
    }
}
