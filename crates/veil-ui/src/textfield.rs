use std::fmt;
use std::ops::Range;

use unicode_segmentation::UnicodeSegmentation;
use veil_core::TextWatcher;

/// find prev/next grapheme boundaries around a byte index
fn prev_grapheme_boundary(text: &str, byte: usize) -> usize {
    let mut last = 0usize;
    for (i, _) in text.grapheme_indices(true) {
        if i >= byte {
            break;
        }
        last = i;
    }
    last
}

fn next_grapheme_boundary(text: &str, byte: usize) -> usize {
    for (i, _) in text.grapheme_indices(true) {
        if i > byte {
            return i;
        }
    }
    text.len()
}

/// last boundary at or before `byte`
fn floor_grapheme_boundary(text: &str, byte: usize) -> usize {
    if byte >= text.len() {
        return text.len();
    }
    let mut last = 0usize;
    for (i, _) in text.grapheme_indices(true) {
        if i > byte {
            break;
        }
        last = i;
    }
    last
}

/// first boundary at or after `byte`
fn ceil_grapheme_boundary(text: &str, byte: usize) -> usize {
    for (i, _) in text.grapheme_indices(true) {
        if i >= byte {
            return i;
        }
    }
    text.len()
}

/// Editable text buffer with selection and IME composition.
///
/// Every mutation goes through [`replace`](Self::replace), which notifies the
/// attached watchers around the change. Offsets are byte indices.
pub struct TextFieldState {
    text: String,
    pub selection: Range<usize>,
    pub composition: Option<Range<usize>>, // IME composition range
    watchers: Vec<Box<dyn TextWatcher>>,
}

impl Default for TextFieldState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextFieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFieldState")
            .field("len", &self.text.len())
            .field("selection", &self.selection)
            .field("composition", &self.composition)
            .field("watchers", &self.watchers.len())
            .finish()
    }
}

impl TextFieldState {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            selection: 0..0,
            composition: None,
            watchers: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn add_watcher(&mut self, watcher: Box<dyn TextWatcher>) {
        self.watchers.push(watcher);
    }

    pub fn clear_watchers(&mut self) {
        self.watchers.clear();
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Replaces `range` with `with`, notifying watchers before and after.
    pub fn replace(&mut self, range: Range<usize>, with: &str) {
        let start = clamp_to_char_boundary(&self.text, range.start.min(self.text.len()));
        let end = clamp_to_char_boundary(&self.text, range.end.min(self.text.len())).max(start);
        let before = end - start;
        let count = with.len();

        for w in &mut self.watchers {
            w.before_text_changed(&self.text, start, before, count);
        }
        self.text.replace_range(start..end, with);
        for w in &mut self.watchers {
            w.on_text_changed(&self.text, start, before, count);
        }
        for w in &mut self.watchers {
            w.after_text_changed(&self.text);
        }
    }

    /// Replaces the whole content and puts the caret at the end.
    pub fn set_text(&mut self, text: &str) {
        self.composition = None;
        let len = self.text.len();
        self.replace(0..len, text);
        let end = self.text.len();
        self.selection = end..end;
    }

    pub fn insert_text(&mut self, text: &str) {
        let Range { start, end } = self.ordered_selection();

        self.replace(start..end, text);
        let new_pos = start + text.len();
        self.selection = new_pos..new_pos;
    }

    pub fn delete_backward(&mut self) {
        if self.selection.start == self.selection.end {
            let pos = self.selection.start.min(self.text.len());
            if pos > 0 {
                let prev = prev_grapheme_boundary(&self.text, pos);
                self.replace(prev..pos, "");
                self.selection = prev..prev;
            }
        } else {
            self.insert_text("");
        }
    }

    pub fn delete_forward(&mut self) {
        if self.selection.start == self.selection.end {
            let pos = self.selection.start.min(self.text.len());
            if pos < self.text.len() {
                let next = next_grapheme_boundary(&self.text, pos);
                self.replace(pos..next, "");
            }
        } else {
            self.insert_text("");
        }
    }

    pub fn move_cursor(&mut self, delta: isize, extend_selection: bool) {
        let mut pos = self.selection.end.min(self.text.len());
        if delta < 0 {
            for _ in 0..delta.unsigned_abs() {
                pos = prev_grapheme_boundary(&self.text, pos);
            }
        } else if delta > 0 {
            for _ in 0..(delta as usize) {
                pos = next_grapheme_boundary(&self.text, pos);
            }
        }
        if extend_selection {
            self.selection.end = pos;
        } else {
            self.selection = pos..pos;
        }
    }

    /// Sets the selection, snapped to char boundaries. No watcher is notified.
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let s = clamp_to_char_boundary(&self.text, selection.start);
        let e = clamp_to_char_boundary(&self.text, selection.end);
        self.selection = s.min(e)..s.max(e);
    }

    pub fn selected_text(&self) -> &str {
        self.text.get(self.ordered_selection()).unwrap_or_default()
    }

    /// Selection as a forward range clamped to the text.
    fn ordered_selection(&self) -> Range<usize> {
        let s = self.selection.start.min(self.text.len());
        let e = self.selection.end.min(self.text.len());
        s.min(e)..s.max(e)
    }

    pub fn set_composition(&mut self, text: String, cursor: Option<(usize, usize)>) {
        if text.is_empty() {
            self.cancel_composition();
            return;
        }

        let anchor_start;
        if let Some(r) = self.composition.take() {
            // Clamp to current text and char boundaries
            let mut s = clamp_to_char_boundary(&self.text, r.start.min(self.text.len()));
            let mut e = clamp_to_char_boundary(&self.text, r.end.min(self.text.len()));
            if e < s {
                std::mem::swap(&mut s, &mut e);
            }
            self.replace(s..e, &text);
            anchor_start = s;
        } else {
            // Insert at caret (snap to boundary)
            let pos = clamp_to_char_boundary(&self.text, self.selection.start.min(self.text.len()));
            self.replace(pos..pos, &text);
            anchor_start = pos;
        }

        self.composition = Some(anchor_start..(anchor_start + text.len()));

        // Map IME cursor (char indices in `text`) to byte offsets relative to anchor_start
        if let Some((c0, c1)) = cursor {
            let b0 = char_to_byte(&text, c0);
            let b1 = char_to_byte(&text, c1);
            self.selection = (anchor_start + b0)..(anchor_start + b1);
        } else {
            let end = anchor_start + text.len();
            self.selection = end..end;
        }
    }

    pub fn commit_composition(&mut self, text: String) {
        if let Some(r) = self.composition.take() {
            let s = clamp_to_char_boundary(&self.text, r.start.min(self.text.len()));
            let e = clamp_to_char_boundary(&self.text, r.end.min(self.text.len()));
            self.replace(s..e, &text);
            let new_pos = s + text.len();
            self.selection = new_pos..new_pos;
        } else {
            // No active composition: insert at caret
            let pos = clamp_to_char_boundary(&self.text, self.selection.end.min(self.text.len()));
            self.replace(pos..pos, &text);
            let new_pos = pos + text.len();
            self.selection = new_pos..new_pos;
        }
    }

    pub fn cancel_composition(&mut self) {
        if let Some(r) = self.composition.take() {
            let s = clamp_to_char_boundary(&self.text, r.start.min(self.text.len()));
            let e = clamp_to_char_boundary(&self.text, r.end.min(self.text.len()));
            if s <= e {
                self.replace(s..e, "");
                self.selection = s..s;
            }
        }
    }

    pub fn delete_surrounding(&mut self, before_bytes: usize, after_bytes: usize) {
        if self.selection.start != self.selection.end {
            self.insert_text("");
            return;
        }

        let caret = self.selection.end.min(self.text.len());
        let start_raw = caret.saturating_sub(before_bytes);
        let end_raw = (caret + after_bytes).min(self.text.len());
        // Widen to the enclosing grapheme boundaries
        let start = floor_grapheme_boundary(&self.text, start_raw);
        let end = ceil_grapheme_boundary(&self.text, end_raw);
        if start < end {
            self.replace(start..end, "");
            self.selection = start..start;
        }
    }
}

fn clamp_to_char_boundary(s: &str, i: usize) -> usize {
    if i >= s.len() {
        return s.len();
    }
    if s.is_char_boundary(i) {
        return i;
    }
    // walk back to previous valid boundary
    let mut j = i;
    while j > 0 && !s.is_char_boundary(j) {
        j -= 1;
    }
    j
}

fn char_to_byte(s: &str, ci: usize) -> usize {
    if ci == 0 {
        0
    } else {
        s.char_indices().nth(ci).map(|(i, _)| i).unwrap_or(s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(String, usize, usize, usize)>>>;

    struct Recorder(Log);

    impl TextWatcher for Recorder {
        fn before_text_changed(&mut self, text: &str, start: usize, count: usize, after: usize) {
            self.0
                .borrow_mut()
                .push((format!("before:{text}"), start, count, after));
        }

        fn on_text_changed(&mut self, text: &str, start: usize, before: usize, count: usize) {
            self.0
                .borrow_mut()
                .push((format!("on:{text}"), start, before, count));
        }
    }

    fn recorded() -> (TextFieldState, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut state = TextFieldState::new();
        state.add_watcher(Box::new(Recorder(log.clone())));
        (state, log)
    }

    #[test]
    fn test_textfield_insert() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello");
        assert_eq!(state.text(), "Hello");
        assert_eq!(state.selection, 5..5);
    }

    #[test]
    fn test_textfield_delete_backward() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello");
        state.delete_backward();
        assert_eq!(state.text(), "Hell");
        assert_eq!(state.selection, 4..4);
    }

    #[test]
    fn test_textfield_selection() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello World");
        state.set_selection(0..5); // Select "Hello"
        assert_eq!(state.selected_text(), "Hello");
        state.insert_text("Hi");
        assert_eq!(state.text(), "Hi World");
        assert_eq!(state.selection, 2..2);
    }

    #[test]
    fn test_textfield_ime_composition() {
        let mut state = TextFieldState::new();
        state.insert_text("Test ");
        state.set_composition("日本".to_string(), Some((0, 2)));
        assert_eq!(state.text(), "Test 日本");
        assert!(state.composition.is_some());

        state.commit_composition("日本語".to_string());
        assert_eq!(state.text(), "Test 日本語");
        assert!(state.composition.is_none());
    }

    #[test]
    fn test_textfield_cursor_movement() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello");
        state.move_cursor(-2, false);
        assert_eq!(state.selection, 3..3);

        state.move_cursor(1, false);
        assert_eq!(state.selection, 4..4);
    }

    #[test]
    fn test_delete_surrounding() {
        let mut state = TextFieldState::new();
        state.insert_text("Hello");
        state.move_cursor(-1, false);
        // caret at 4: delete "l" before and "o" after
        state.delete_surrounding(1, 1);
        assert_eq!(state.text(), "Hel");
        assert_eq!(state.selection, 3..3);
    }

    #[test]
    fn test_grapheme_delete_and_move() {
        // "👍🏽" is a grapheme cluster (thumbs up + skin tone)
        let mut st = TextFieldState::new();
        st.insert_text("A👍🏽B");
        // Move left over 'B'
        st.move_cursor(-1, false);
        assert_eq!(st.selection.end, "A👍🏽".len());
        st.delete_backward();
        assert_eq!(st.text(), "AB");
        assert_eq!(st.selection, "A".len().."A".len());
    }

    #[test]
    fn test_watchers_see_text_before_and_after() {
        let (mut state, log) = recorded();
        state.insert_text("ab");
        state.insert_text("c");
        let log = log.borrow();
        assert_eq!(log[0], ("before:".to_string(), 0, 0, 2));
        assert_eq!(log[1], ("on:ab".to_string(), 0, 0, 2));
        assert_eq!(log[2], ("before:ab".to_string(), 2, 0, 1));
        assert_eq!(log[3], ("on:abc".to_string(), 2, 0, 1));
    }

    #[test]
    fn test_set_text_reports_full_replacement() {
        let (mut state, log) = recorded();
        state.insert_text("old");
        log.borrow_mut().clear();
        state.set_text("newer");
        assert_eq!(state.text(), "newer");
        assert_eq!(state.selection, 5..5);
        assert_eq!(log.borrow()[1], ("on:newer".to_string(), 0, 3, 5));
    }

    #[test]
    fn test_backspace_reports_grapheme_width() {
        let (mut state, log) = recorded();
        state.insert_text("a👍🏽");
        log.borrow_mut().clear();
        state.delete_backward();
        assert_eq!(log.borrow()[1], ("on:a".to_string(), 1, "👍🏽".len(), 0));
    }

    #[test]
    fn test_cursor_moves_do_not_notify() {
        let (mut state, log) = recorded();
        state.insert_text("abc");
        log.borrow_mut().clear();
        state.move_cursor(-1, true);
        state.set_selection(0..1);
        assert!(log.borrow().is_empty());
    }
}
