//! Resource cards: the pure mapping from inventory data to visuals.
//!
//! Every function here is a deterministic function of its arguments: no I/O,
//! no clocks, no hidden state. Both the ratatui grid ([`crate::grid`]) and
//! the plain-text renderer ([`crate::text`]) consume [`CardDescriptor`]s so
//! the two outputs can never disagree about a resource's classification.

use std::time::Duration;

use rca_core::types::{InventorySnapshot, Resource, ResourceStatus};


/// Delay between consecutive cards' entrance.
pub const ENTRANCE_STAGGER: Duration = Duration::from_millis(100);

/// Text shown in place of the grid until the first snapshot arrives.
pub const LOADING_TEXT: &str = "Scanning infrastructure...";


/// Which glyph identifies the resource category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Server,
    Database,
    Activity,
    GenericBox,
}


impl IconKind {
    /// Map a resource type tag to its icon. Total: unknown tags get a box.
    pub fn for_type(kind: &str) -> Self {
        match kind {
            "EC2" => IconKind::Server,
            "RDS" => IconKind::Database,
            "Lambda" => IconKind::Activity,
            _ => IconKind::GenericBox,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            IconKind::Server => "\u{25a4}",     // ▤
            IconKind::Database => "\u{25d2}",   // ◒
            IconKind::Activity => "\u{223f}",   // ∿
            IconKind::GenericBox => "\u{25a1}", // □
        }
    }
}


/// Semantic status color; themes turn it into a concrete terminal color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    /// Fallback for statuses outside the known set.
    Neutral,
}


impl StatusColor {
    pub fn for_status(status: &ResourceStatus) -> Self {
        match status {
            ResourceStatus::Healthy => StatusColor::Green,
            ResourceStatus::Warning => StatusColor::Yellow,
            ResourceStatus::Critical => StatusColor::Red,
            ResourceStatus::Unknown(_) => StatusColor::Neutral,
        }
    }
}


/// Cosmetic motion hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Animation {
    Static,
    Pulse,
    Bounce,
}


impl Animation {
    pub fn for_status(status: &ResourceStatus) -> Self {
        match status {
            ResourceStatus::Warning => Animation::Pulse,
            ResourceStatus::Critical => Animation::Bounce,
            ResourceStatus::Healthy | ResourceStatus::Unknown(_) => Animation::Static,
        }
    }
}


/// Everything needed to draw one resource card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDescriptor {
    /// Resource id, shown as the card title.
    pub title: String,
    /// `"<type> Resource"`.
    pub subtitle: String,
    pub icon: IconKind,
    pub color: StatusColor,
    /// Upper-cased status text.
    pub label: String,
    pub region: String,
    pub animation: Animation,
    /// How long after the snapshot arrives the card should appear.
    pub entrance_delay: Duration,
}


/// Stand-in for control characters in server-supplied text.
pub const REPLACEMENT: char = '\u{fffd}';


/// Replace control characters (ESC, BEL, newlines, ...) so inventory text
/// cannot drive the terminal.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { REPLACEMENT } else { c })
        .collect()
}


/// Describe a single resource at grid position `index`. All text fields
/// are passed through [`sanitize`].
pub fn describe(resource: &Resource, index: usize) -> CardDescriptor {
    CardDescriptor {
        title: sanitize(&resource.id),
        subtitle: format!("{} Resource", sanitize(&resource.kind)),
        icon: IconKind::for_type(&resource.kind),
        color: StatusColor::for_status(&resource.status),
        label: sanitize(resource.status.as_str()).to_uppercase(),
        region: sanitize(&resource.region),
        animation: Animation::for_status(&resource.status),
        entrance_delay: ENTRANCE_STAGGER * index as u32,
    }
}


/// Describe every resource, in snapshot order. Duplicate ids are kept.
pub fn describe_all(snapshot: &InventorySnapshot) -> Vec<CardDescriptor> {
    snapshot
        .resources
        .iter()
        .enumerate()
        .map(|(i, resource)| describe(resource, i))
        .collect()
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
