/// Inline keyboard: rows of buttons under a message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonAction {
    /// Sent back to the bot as a callback query.
    Callback(String),
    /// Opens a link on the client.
    Url(String),
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: ButtonAction::Url(url.into()),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Lay buttons out `per_row` at a time.
    pub fn grid(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut rows = Vec::new();
        let mut row = Vec::with_capacity(per_row);
        for b in buttons {
            row.push(b);
            if row.len() == per_row {
                rows.push(std::mem::take(&mut row));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// Limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    /// Maximum message size in UTF-16 code units.
    pub max_message_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_fills_rows_left_to_right() {
        let kb = InlineKeyboard::grid(
            (0..5)
                .map(|i| InlineButton::callback(format!("b{i}"), format!("d{i}")))
                .collect(),
            2,
        );
        let shape: Vec<usize> = kb.rows.iter().map(Vec::len).collect();
        assert_eq!(shape, vec![2, 2, 1]);
        assert_eq!(kb.buttons().count(), 5);
    }
}
