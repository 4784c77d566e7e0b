//! The status bar floating over the bottom corner of a files view.
//!
//! Shows a primary and a details label, an optional spinner and optional action
//! buttons. A bar without actions dodges the pointer by jumping to the other corner.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 32;

/// Horizontal alignment inside the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Start,
    End,
}

/// CSS box edges, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Border {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Border {
    pub fn uniform(width: i32) -> Self {
        Self {
            top: width,
            right: width,
            bottom: width,
            left: width,
        }
    }

    fn add(self, other: Self) -> Self {
        Self {
            top: self.top + other.top,
            right: self.right + other.right,
            bottom: self.bottom + other.bottom,
            left: self.left + other.left,
        }
    }
}

/// Minimum and natural size along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeRequest {
    pub minimum: i32,
    pub natural: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarProperty {
    PrimaryLabel,
    DetailsLabel,
    ShowSpinner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloatingBarEvent {
    /// A property changed value
    Notify(BarProperty),
    /// An action button was clicked
    Action(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionButton {
    pub icon_name: String,
    pub action_id: i32,
}

pub struct FloatingBar {
    primary_label: Option<String>,
    details_label: Option<String>,
    show_spinner: bool,
    spinning: bool,
    visible: bool,
    is_interactive: bool,
    halign: Align,
    actions: Vec<ActionButton>,
    padding: Border,
    border: Border,
    events: broadcast::Sender<FloatingBarEvent>,
}

impl FloatingBar {
    pub fn new(primary_label: Option<&str>, details_label: Option<&str>, show_spinner: bool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            primary_label: primary_label.map(str::to_string),
            details_label: details_label.map(str::to_string),
            show_spinner,
            spinning: false,
            visible: false,
            is_interactive: false,
            halign: Align::End,
            actions: Vec::new(),
            padding: Border::default(),
            border: Border::default(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FloatingBarEvent> {
        self.events.subscribe()
    }

    pub fn primary_label(&self) -> Option<&str> {
        self.primary_label.as_deref()
    }

    pub fn details_label(&self) -> Option<&str> {
        self.details_label.as_deref()
    }

    /// Labels are only shown when they have text.
    pub fn primary_label_visible(&self) -> bool {
        self.primary_label.as_deref().is_some_and(|l| !l.is_empty())
    }

    pub fn details_label_visible(&self) -> bool {
        self.details_label.as_deref().is_some_and(|l| !l.is_empty())
    }

    pub fn set_primary_label(&mut self, label: Option<&str>) {
        if self.primary_label.as_deref() != label {
            self.primary_label = label.map(str::to_string);
            self.notify(BarProperty::PrimaryLabel);
        }
    }

    pub fn set_details_label(&mut self, label: Option<&str>) {
        if self.details_label.as_deref() != label {
            self.details_label = label.map(str::to_string);
            self.notify(BarProperty::DetailsLabel);
        }
    }

    pub fn set_labels(&mut self, primary_label: Option<&str>, details_label: Option<&str>) {
        self.set_primary_label(primary_label);
        self.set_details_label(details_label);
    }

    pub fn show_spinner(&self) -> bool {
        self.show_spinner
    }

    /// Shows or hides the spinner widget. Doesn't start it; `show` does.
    pub fn set_show_spinner(&mut self, show_spinner: bool) {
        if self.show_spinner != show_spinner {
            self.show_spinner = show_spinner;
            self.notify(BarProperty::ShowSpinner);
        }
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
        if self.show_spinner {
            self.spinning = true;
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.spinning = false;
    }

    /// Adds a button at the end of the bar. Clicking it emits `Action(action_id)`.
    pub fn add_action(&mut self, icon_name: &str, action_id: i32) {
        self.actions.push(ActionButton {
            icon_name: icon_name.to_string(),
            action_id,
        });
        self.is_interactive = true;
    }

    /// Removes all action buttons.
    pub fn cleanup_actions(&mut self) {
        self.actions.clear();
        self.is_interactive = false;
    }

    pub fn actions(&self) -> &[ActionButton] {
        &self.actions
    }

    pub fn is_interactive(&self) -> bool {
        self.is_interactive
    }

    /// Clicks the button for `action_id`. Returns false when there is no such button.
    pub fn click_action(&self, action_id: i32) -> bool {
        if !self.actions.iter().any(|a| a.action_id == action_id) {
            return false;
        }
        let _ = self.events.send(FloatingBarEvent::Action(action_id));
        true
    }

    pub fn halign(&self) -> Align {
        self.halign
    }

    pub fn set_halign(&mut self, halign: Align) {
        self.halign = halign;
    }

    /// The pointer entered the bar's area in the overlay.
    ///
    /// Non-interactive bars move to the opposite corner so they don't cover what the
    /// user is pointing at. Interactive bars stay put so their buttons can be clicked.
    pub fn pointer_entered(&mut self) {
        if self.is_interactive {
            return;
        }
        self.halign = match self.halign {
            Align::Start => Align::End,
            Align::End => Align::Start,
        };
    }

    /// Sets the style's padding and border, which are added to the content size.
    pub fn set_style(&mut self, padding: Border, border: Border) {
        self.padding = padding;
        self.border = border;
    }

    pub fn preferred_width(&self, content: SizeRequest) -> SizeRequest {
        let edges = self.padding.add(self.border);
        grow(content, edges.left + edges.right)
    }

    pub fn preferred_height(&self, content: SizeRequest) -> SizeRequest {
        let edges = self.padding.add(self.border);
        grow(content, edges.top + edges.bottom)
    }

    fn notify(&self, property: BarProperty) {
        let _ = self.events.send(FloatingBarEvent::Notify(property));
    }
}

fn grow(content: SizeRequest, by: i32) -> SizeRequest {
    SizeRequest {
        minimum: content.minimum + by,
        natural: content.natural + by,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_visible_only_with_text() {
        let mut bar = FloatingBar::new(Some("3 items selected"), None, false);
        assert!(bar.primary_label_visible());
        assert!(!bar.details_label_visible());

        bar.set_labels(Some(""), Some("12 kB"));
        assert!(!bar.primary_label_visible());
        assert!(bar.details_label_visible());
    }

    #[test]
    fn setting_same_value_does_not_notify() {
        let mut bar = FloatingBar::new(Some("a"), Some("b"), false);
        let mut events = bar.subscribe();

        bar.set_primary_label(Some("a"));
        bar.set_details_label(Some("b"));
        bar.set_show_spinner(false);
        assert!(events.try_recv().is_err());

        bar.set_primary_label(Some("c"));
        bar.set_details_label(None);
        bar.set_show_spinner(true);
        assert_eq!(events.try_recv().unwrap(), FloatingBarEvent::Notify(BarProperty::PrimaryLabel));
        assert_eq!(events.try_recv().unwrap(), FloatingBarEvent::Notify(BarProperty::DetailsLabel));
        assert_eq!(events.try_recv().unwrap(), FloatingBarEvent::Notify(BarProperty::ShowSpinner));
    }

    #[test]
    fn show_starts_spinner_only_when_enabled() {
        let mut bar = FloatingBar::new(None, None, false);
        bar.show();
        assert!(bar.is_visible());
        assert!(!bar.is_spinning());

        bar.set_show_spinner(true);
        bar.show();
        assert!(bar.is_spinning());

        bar.hide();
        assert!(!bar.is_visible());
        assert!(!bar.is_spinning());
    }

    #[test]
    fn actions_emit_their_id_and_make_bar_interactive() {
        let mut bar = FloatingBar::new(Some("Loading"), None, true);
        let mut events = bar.subscribe();

        bar.add_action("process-stop-symbolic", 1);
        assert!(bar.is_interactive());
        assert!(bar.click_action(1));
        assert!(!bar.click_action(2));
        assert_eq!(events.try_recv().unwrap(), FloatingBarEvent::Action(1));
        assert!(events.try_recv().is_err());

        bar.cleanup_actions();
        assert!(bar.actions().is_empty());
        assert!(!bar.is_interactive());
        assert!(!bar.click_action(1));
    }

    #[test]
    fn pointer_flips_alignment_unless_interactive() {
        let mut bar = FloatingBar::new(None, None, false);
        bar.set_halign(Align::Start);

        bar.pointer_entered();
        assert_eq!(bar.halign(), Align::End);
        bar.pointer_entered();
        assert_eq!(bar.halign(), Align::Start);

        bar.add_action("process-stop-symbolic", 0);
        bar.pointer_entered();
        assert_eq!(bar.halign(), Align::Start);
    }

    #[test]
    fn preferred_size_adds_padding_and_border() {
        let mut bar = FloatingBar::new(None, None, false);
        bar.set_style(
            Border {
                top: 2,
                right: 6,
                bottom: 2,
                left: 6,
            },
            Border::uniform(1),
        );

        let content = SizeRequest {
            minimum: 100,
            natural: 180,
        };
        assert_eq!(
            bar.preferred_width(content),
            SizeRequest {
                minimum: 114,
                natural: 194,
            }
        );
        assert_eq!(
            bar.preferred_height(SizeRequest {
                minimum: 20,
                natural: 24,
            }),
            SizeRequest {
                minimum: 26,
                natural: 30,
            }
        );
    }
}
