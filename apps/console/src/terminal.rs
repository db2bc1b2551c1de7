//! Terminal stand-in for the browser page.

use std::sync::{Mutex, MutexGuard};

use client_core::{Notice, NoticeId, NoticeTone, RenderedView, ViewSurface, WithdrawControl};
use tracing::debug;

#[derive(Default)]
struct TerminalState {
    view: Option<RenderedView>,
    active_notice: Option<NoticeId>,
}

/// Prints every mounted view in full and keeps the latest one so the shell
/// can resolve selections and withdrawal rows against what the user sees.
#[derive(Default)]
pub struct TerminalSurface {
    state: Mutex<TerminalState>,
}

impl TerminalSurface {
    fn state(&self) -> MutexGuard<'_, TerminalState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Selects the enroll option with the given 1-based number.
    pub fn select(&self, option_number: usize) -> Option<String> {
        let mut state = self.state();
        let selector = state.view.as_mut()?.selector_mut()?;
        let name = selector
            .options()
            .get(option_number.checked_sub(1)?)?
            .clone();
        selector.select(&name);
        Some(name)
    }

    /// The selection as it stands right now; a re-render in between clears it.
    pub fn selected_activity(&self) -> Option<String> {
        let state = self.state();
        let selected = state
            .view
            .as_ref()?
            .selector()?
            .selected()
            .map(str::to_string);
        selected
    }

    /// Withdrawal control of the given 1-based row in the current view.
    pub fn withdraw_control(&self, row_number: usize) -> Option<WithdrawControl> {
        let state = self.state();
        let control = state
            .view
            .as_ref()?
            .withdraw_controls()
            .nth(row_number.checked_sub(1)?)
            .cloned();
        control
    }
}

impl ViewSurface for TerminalSurface {
    fn mount(&self, view: &RenderedView) {
        println!("\n{view}");
        self.state().view = Some(view.clone());
    }

    fn show_notice(&self, notice: &Notice) {
        let label = match notice.tone {
            NoticeTone::Success => "ok",
            NoticeTone::Error => "error",
        };
        println!("[{label}] {}", notice.text);
        self.state().active_notice = Some(notice.id);
    }

    fn clear_notice(&self, id: NoticeId) {
        let mut state = self.state();
        if state.active_notice == Some(id) {
            state.active_notice = None;
            debug!("console: notice {} expired", id.0);
        }
    }

    fn alert(&self, text: &str) {
        eprintln!("\n!! {text}\n");
    }

    fn reset_enroll_form(&self) {
        if let Some(selector) = self.state().view.as_mut().and_then(RenderedView::selector_mut) {
            selector.clear();
        }
    }
}
