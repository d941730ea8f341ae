//! Line-grouped validation errors with progressive disclosure
//!
//! Errors are grouped by line in first-appearance order, then the groups are
//! sorted numerically by line. Only the first [`INITIAL_GROUPS`] are rendered
//! until "show more" reveals the rest.

use std::collections::HashMap;

use fono_common::models::ValidationError;
use fono_common::text::{error_count_label, or_placeholder, truncate_display, VALUE_DISPLAY_CHARS};

/// Groups rendered before "show more"
pub const INITIAL_GROUPS: usize = 10;

/// All errors reported for one line
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorGroup {
    line: u32,
    errors: Vec<ValidationError>,
    expanded: bool,
}

/// One rendered error inside an expanded group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl ErrorGroup {
    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// `Linha N`
    pub fn title(&self) -> String {
        format!("Linha {}", self.line)
    }

    /// `1 erro` / `N erros`
    pub fn count_label(&self) -> String {
        error_count_label(self.errors.len())
    }

    pub fn details(&self) -> Vec<ErrorDetail> {
        self.errors
            .iter()
            .map(|e| ErrorDetail {
                field: or_placeholder(e.field.as_deref()).to_string(),
                value: truncate_display(&e.value.to_string(), VALUE_DISPLAY_CHARS),
                message: or_placeholder(Some(&e.message)).to_string(),
            })
            .collect()
    }
}

/// Collapsible error list for the current import result
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorPanel {
    groups: Vec<ErrorGroup>,
    revealed: usize,
}

impl ErrorPanel {
    pub fn build(errors: Vec<ValidationError>) -> Self {
        let mut groups: Vec<ErrorGroup> = Vec::new();
        let mut index: HashMap<u32, usize> = HashMap::new();
        for error in errors {
            match index.get(&error.line) {
                Some(&at) => groups[at].errors.push(error),
                None => {
                    index.insert(error.line, groups.len());
                    groups.push(ErrorGroup {
                        line: error.line,
                        errors: vec![error],
                        expanded: false,
                    });
                }
            }
        }
        groups.sort_by_key(|g| g.line);

        let revealed = groups.len().min(INITIAL_GROUPS);
        Self { groups, revealed }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn total_errors(&self) -> usize {
        self.groups.iter().map(|g| g.errors.len()).sum()
    }

    /// Groups currently on screen
    pub fn rendered(&self) -> &[ErrorGroup] {
        &self.groups[..self.revealed]
    }

    /// Groups still hidden behind "show more"
    pub fn hidden_count(&self) -> usize {
        self.groups.len() - self.revealed
    }

    pub fn show_more_visible(&self) -> bool {
        self.hidden_count() > 0
    }

    /// Reveal every remaining group, in order
    pub fn show_more(&mut self) {
        self.revealed = self.groups.len();
    }

    /// Flip one rendered group; unknown or hidden lines are ignored
    pub fn toggle(&mut self, line: u32) -> Option<bool> {
        let group = self.groups[..self.revealed]
            .iter_mut()
            .find(|g| g.line == line)?;
        group.expanded = !group.expanded;
        Some(group.expanded)
    }

    /// Also applies to groups revealed later
    pub fn expand_all(&mut self) {
        self.set_all(true);
    }

    pub fn collapse_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, expanded: bool) {
        for group in &mut self.groups {
            group.expanded = expanded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fono_common::models::CellValue;

    fn error(line: u32, field: &str, message: &str) -> ValidationError {
        ValidationError {
            line,
            field: Some(field.to_string()),
            value: CellValue::Null,
            message: message.to_string(),
        }
    }

    fn lines(panel: &ErrorPanel) -> Vec<u32> {
        panel.rendered().iter().map(|g| g.line()).collect()
    }

    #[test]
    fn test_groups_sorted_numerically() {
        let panel = ErrorPanel::build(vec![
            error(10, "isrc", "a"),
            error(2, "titulo", "b"),
            error(10, "genero", "c"),
            error(9, "isrc", "d"),
        ]);
        assert_eq!(lines(&panel), vec![2, 9, 10]);

        let ten = &panel.rendered()[2];
        let messages: Vec<&str> = ten.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "c"]);
        assert_eq!(ten.count_label(), "2 erros");
        assert_eq!(panel.rendered()[0].count_label(), "1 erro");
    }

    #[test]
    fn test_few_groups_start_collapsed_and_expand_all() {
        let mut panel = ErrorPanel::build((1..=4).map(|l| error(l, "isrc", "x")).collect());
        assert_eq!(panel.rendered().len(), 4);
        assert!(!panel.show_more_visible());
        assert!(panel.rendered().iter().all(|g| !g.is_expanded()));

        panel.expand_all();
        assert!(panel.rendered().iter().all(|g| g.is_expanded()));
    }

    #[test]
    fn test_show_more_appends_remaining() {
        let mut panel = ErrorPanel::build((1..=25).rev().map(|l| error(l, "isrc", "x")).collect());
        assert_eq!(lines(&panel), (1..=10).collect::<Vec<_>>());
        assert!(panel.show_more_visible());
        assert_eq!(panel.hidden_count(), 15);

        panel.show_more();
        assert_eq!(lines(&panel), (1..=25).collect::<Vec<_>>());
        assert!(!panel.show_more_visible());
    }

    #[test]
    fn test_expand_all_covers_later_reveals() {
        let mut panel = ErrorPanel::build((1..=12).map(|l| error(l, "isrc", "x")).collect());
        panel.expand_all();
        panel.show_more();
        assert!(panel.rendered().iter().all(|g| g.is_expanded()));

        panel.collapse_all();
        assert!(panel.rendered().iter().all(|g| !g.is_expanded()));
    }

    #[test]
    fn test_toggle_is_independent() {
        let mut panel = ErrorPanel::build((1..=12).map(|l| error(l, "isrc", "x")).collect());
        assert_eq!(panel.toggle(3), Some(true));
        assert!(!panel.rendered()[0].is_expanded());
        assert_eq!(panel.toggle(3), Some(false));
        // line 12 is not rendered yet
        assert_eq!(panel.toggle(12), None);
    }

    #[test]
    fn test_details_truncate_and_placeholder() {
        let long = "x".repeat(40);
        let panel = ErrorPanel::build(vec![ValidationError {
            line: 1,
            field: None,
            value: CellValue::Text(long),
            message: String::new(),
        }]);
        let details = panel.rendered()[0].details();
        let detail = &details[0];
        assert_eq!(detail.field, "-");
        assert_eq!(detail.value, format!("{}...", "x".repeat(30)));
        assert_eq!(detail.message, "-");
    }

    #[test]
    fn test_numeric_values_render() {
        let panel = ErrorPanel::build(vec![ValidationError {
            line: 1,
            field: Some("ano_lanc".into()),
            value: CellValue::Integer(19999),
            message: "Ano inválido".into(),
        }]);
        assert_eq!(panel.rendered()[0].details()[0].value, "19999");
        assert_eq!(panel.total_errors(), 1);
    }
}
