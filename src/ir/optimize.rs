//! # IR Optimizer
//!
//! Passes that shrink a program without changing what gets printed:
//!
//! 1. **Remove redundant init**: only the first Init survives
//! 2. **Remove redundant styles**: don't emit `SetBold(true)` if already bold
//! 3. **Collapse style toggles**: `SetBold(false), SetBold(true)` → nothing
//! 4. **Merge adjacent text**: combine consecutive Text ops
//!
//! Pass 3 relies on pass 2: a surviving "off" means the style really was
//! on. Style ops only matter at the start of a line, so the pair may be
//! separated by newlines.

use super::ops::{Op, Program, StyleState};

impl Program {
    /// Apply all optimization passes.
    pub fn optimize(self) -> Self {
        let before = self.ops.len();
        let ops = self.ops;
        let ops = remove_redundant_init(ops);
        let ops = remove_redundant_styles(ops);
        let ops = collapse_style_toggles(ops);
        let ops = merge_adjacent_text(ops);
        tracing::trace!(before, after = ops.len(), "optimized program");
        Program { ops }
    }
}

/// Remove duplicate Init ops, keeping only the first one.
fn remove_redundant_init(ops: Vec<Op>) -> Vec<Op> {
    let mut seen_init = false;
    ops.into_iter()
        .filter(|op| {
            if matches!(op, Op::Init) {
                if seen_init {
                    return false;
                }
                seen_init = true;
            }
            true
        })
        .collect()
}

/// Remove style off/on pairs with only newlines between them.
fn collapse_style_toggles(ops: Vec<Op>) -> Vec<Op> {
    let mut result: Vec<Op> = Vec::with_capacity(ops.len());

    for op in ops {
        let toggled_back = match (&op, last_style_before_newlines(&result)) {
            (Op::SetBold { on: true }, Some(Op::SetBold { on: false })) => true,
            (Op::SetDoubleHeight { on: true }, Some(Op::SetDoubleHeight { on: false })) => true,
            _ => false,
        };
        if toggled_back {
            // Drop the "off" and skip the "on"
            if let Some(pos) = result.iter().rposition(Op::is_style) {
                result.remove(pos);
            }
            continue;
        }
        result.push(op);
    }

    result
}

/// Last op before any trailing Newlines, if it is a style op.
fn last_style_before_newlines(ops: &[Op]) -> Option<&Op> {
    ops.iter()
        .rev()
        .find(|op| !matches!(op, Op::Newline))
        .filter(|op| op.is_style())
}

/// Remove style changes that don't change the current state.
fn remove_redundant_styles(ops: Vec<Op>) -> Vec<Op> {
    let mut result = Vec::with_capacity(ops.len());
    let mut state = StyleState::default();

    for op in ops {
        match &op {
            Op::Init => {
                state = StyleState::default();
                result.push(op);
            }
            Op::SetAlign { align } => {
                if *align != state.alignment {
                    state.alignment = *align;
                    result.push(op);
                }
            }
            Op::SetBold { on } => {
                if *on != state.bold {
                    state.bold = *on;
                    result.push(op);
                }
            }
            Op::SetDoubleHeight { on } => {
                if *on != state.double_height {
                    state.double_height = *on;
                    result.push(op);
                }
            }

            // Non-style ops pass through unchanged
            _ => result.push(op),
        }
    }

    result
}

/// Merge consecutive Text ops into a single op.
fn merge_adjacent_text(ops: Vec<Op>) -> Vec<Op> {
    let mut result = Vec::with_capacity(ops.len());
    let mut pending_text: Option<String> = None;

    for op in ops {
        match op {
            Op::Text { text } => match pending_text {
                Some(ref mut pending) => pending.push_str(&text),
                None => pending_text = Some(text),
            },
            other => {
                if let Some(text) = pending_text.take() {
                    result.push(Op::Text { text });
                }
                result.push(other);
            }
        }
    }

    if let Some(text) = pending_text {
        result.push(Op::Text { text });
    }

    result
}
