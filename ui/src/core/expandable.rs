//! Measurement and open-state logic behind [`ExpandableTextBlock`].
//!
//! The block renders its children clamped to a number of lines, remembers how
//! tall that clamped rendering was, and opens to the full height when the
//! user activates it. Two ordered layout passes drive it:
//!
//! 1. after mount, with clamp styling active: [`ExpandableState::record_closed_height`]
//! 2. after that height is committed, clamp styling removed:
//!    [`ExpandableState::check_fit`]
//!
//! If the unclamped content is no taller than the box it sits in, the clamp
//! was doing nothing and the block opens on its own.
//!
//! Nothing here touches the DOM. Hosts that can read heights synchronously
//! go through [`LayoutMeasurer`]; the Dioxus component reads them
//! asynchronously and feeds the numbers in directly.
//!
//! [`ExpandableTextBlock`]: crate::components::ExpandableTextBlock

use std::num::NonZeroU32;

/// Element whose rendered height a [`LayoutMeasurer`] can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutNode {
    /// Outer box, bounded to the closed height while closed.
    Wrapper,
    /// Inner element holding the children.
    Content,
}

/// Synchronous height reads in CSS pixels.
pub trait LayoutMeasurer {
    fn measure_height(&self, node: LayoutNode) -> f64;
}

impl<F> LayoutMeasurer for F
where
    F: Fn(LayoutNode) -> f64,
{
    fn measure_height(&self, node: LayoutNode) -> f64 {
        self(node)
    }
}

/// Where a block is in its lifecycle. There is no edge back to a closed
/// variant once `Open` is reached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExpandPhase {
    /// Mounted, not laid out yet. Clamp styling is active.
    Unmeasured,
    /// Clamped height recorded; the fit check has not run.
    ClosedClamped { closed_height: f64 },
    /// The clamp hides content; stays here until activated.
    WaitingForInteraction { closed_height: f64 },
    /// Fully expanded.
    Open { closed_height: Option<f64> },
}

/// Result of the second layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitCheck {
    /// Content fits inside the clamped box; the block opened itself.
    Fits,
    /// Content overflows the clamped box.
    Clamped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpandableState {
    phase: ExpandPhase,
    clamp: Option<NonZeroU32>,
}

impl ExpandableState {
    /// `lines_when_closed <= 0` means no clamp at all, so the block starts
    /// open the same way `already_open` does.
    pub fn new(lines_when_closed: i64, already_open: bool) -> Self {
        let clamp = u32::try_from(lines_when_closed)
            .ok()
            .and_then(NonZeroU32::new);

        let phase = if already_open || clamp.is_none() {
            ExpandPhase::Open {
                closed_height: None,
            }
        } else {
            ExpandPhase::Unmeasured
        };

        Self { phase, clamp }
    }

    pub fn phase(&self) -> ExpandPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        matches!(self.phase, ExpandPhase::Open { .. })
    }

    pub fn clamp_lines(&self) -> Option<NonZeroU32> {
        self.clamp
    }

    pub fn closed_height(&self) -> Option<f64> {
        match self.phase {
            ExpandPhase::Unmeasured => None,
            ExpandPhase::ClosedClamped { closed_height }
            | ExpandPhase::WaitingForInteraction { closed_height } => Some(closed_height),
            ExpandPhase::Open { closed_height } => closed_height,
        }
    }

    /// True until the first layout pass has been recorded.
    pub fn needs_measurement(&self) -> bool {
        matches!(self.phase, ExpandPhase::Unmeasured)
    }

    /// True between the two layout passes.
    pub fn awaiting_fit_check(&self) -> bool {
        matches!(self.phase, ExpandPhase::ClosedClamped { .. })
    }

    /// First pass. Only the first call while unmeasured sticks; later calls
    /// (re-rendered children, a block that is already open) are ignored.
    pub fn record_closed_height(&mut self, height: f64) -> bool {
        if !self.needs_measurement() {
            return false;
        }
        self.phase = ExpandPhase::ClosedClamped {
            closed_height: sanitize(height),
        };
        true
    }

    /// Second pass. Returns `None` when the block is not waiting for a fit
    /// check. Exact equality counts as a fit.
    pub fn check_fit(&mut self, wrapper_height: f64, content_height: f64) -> Option<FitCheck> {
        let ExpandPhase::ClosedClamped { closed_height } = self.phase else {
            return None;
        };

        if sanitize(wrapper_height) >= sanitize(content_height) {
            self.phase = ExpandPhase::Open {
                closed_height: Some(closed_height),
            };
            Some(FitCheck::Fits)
        } else {
            self.phase = ExpandPhase::WaitingForInteraction { closed_height };
            Some(FitCheck::Clamped)
        }
    }

    /// Pointer or keyboard activation. Opens from any closed phase; returns
    /// whether anything changed.
    pub fn activate(&mut self) -> bool {
        if self.is_open() {
            return false;
        }
        self.phase = ExpandPhase::Open {
            closed_height: self.closed_height(),
        };
        true
    }

    /// First pass against a synchronous host.
    pub fn measure_closed<M>(&mut self, measurer: &M) -> bool
    where
        M: LayoutMeasurer + ?Sized,
    {
        if !self.needs_measurement() {
            return false;
        }
        let height = measurer.measure_height(LayoutNode::Content);
        self.record_closed_height(height)
    }

    /// Second pass against a synchronous host.
    pub fn measure_fit<M>(&mut self, measurer: &M) -> Option<FitCheck>
    where
        M: LayoutMeasurer + ?Sized,
    {
        if !self.awaiting_fit_check() {
            return None;
        }
        let wrapper = measurer.measure_height(LayoutNode::Wrapper);
        let content = measurer.measure_height(LayoutNode::Content);
        self.check_fit(wrapper, content)
    }

    /// Inline style for the outer box.
    pub fn container_style(&self) -> String {
        match self.phase {
            ExpandPhase::Open { .. } => "height: max-content; overflow: hidden;".to_string(),
            ExpandPhase::Unmeasured => "overflow: hidden;".to_string(),
            ExpandPhase::ClosedClamped { closed_height }
            | ExpandPhase::WaitingForInteraction { closed_height } => {
                format!("height: {closed_height}px; overflow: hidden;")
            }
        }
    }

    /// Line-clamp style for the inner element, present only before the
    /// closed height is known.
    pub fn content_style(&self) -> Option<String> {
        match (self.phase, self.clamp) {
            (ExpandPhase::Unmeasured, Some(lines)) => Some(format!(
                "-webkit-line-clamp: {lines}; -webkit-box-orient: vertical; display: -webkit-box;"
            )),
            _ => None,
        }
    }

    /// Class list for the outer box, `extra` first. `text-block--clamped`
    /// only appears once the fit check has shown content is actually hidden.
    pub fn container_class(&self, extra: &str) -> String {
        let mut classes = String::new();
        if !extra.trim().is_empty() {
            classes.push_str(extra.trim());
            classes.push(' ');
        }
        classes.push_str("text-block");
        match self.phase {
            ExpandPhase::Open { .. } => classes.push_str(" text-block--open"),
            ExpandPhase::WaitingForInteraction { .. } => classes.push_str(" text-block--clamped"),
            ExpandPhase::Unmeasured | ExpandPhase::ClosedClamped { .. } => {}
        }
        classes
    }
}

/// Layout engines hand back NaN or negative values for detached nodes.
fn sanitize(height: f64) -> f64 {
    if height.is_finite() && height > 0.0 {
        height
    } else {
        0.0
    }
}
