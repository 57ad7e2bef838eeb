//! Actor declaration tracking for validation.
//!
//! Each process opens a frame holding the actors it declares and the actors
//! its steps actually use. Closing the frame reports the declared actors that
//! no step used.

use std::collections::HashSet;

use ebl_types::CanonicalName;

use crate::ast::Ident;

/// Declarations and uses for one process.
#[derive(Debug, Default)]
pub struct ActorFrame {
    process: String,
    /// Declared actors in declaration order, first occurrence only.
    declared: Vec<Ident>,
    declared_names: HashSet<CanonicalName>,
    used: HashSet<CanonicalName>,
}

impl ActorFrame {
    pub fn process(&self) -> &str {
        &self.process
    }

    /// Declared actors that no step used, in declaration order.
    pub fn unused(&self) -> impl Iterator<Item = &Ident> {
        self.declared
            .iter()
            .filter(|actor| !self.used.contains(CanonicalName::new(&actor.name).as_str()))
    }
}

/// Tracks actor frames across nested process scopes.
#[derive(Debug, Default)]
pub struct ActorTracker {
    frames: Vec<ActorFrame>,
}

impl ActorTracker {
    /// Open a frame for a process.
    pub fn push_frame(&mut self, process: impl Into<String>) {
        self.frames.push(ActorFrame {
            process: process.into(),
            ..ActorFrame::default()
        });
    }

    /// Close the current frame and hand it back.
    pub fn pop_frame(&mut self) -> Option<ActorFrame> {
        self.frames.pop()
    }

    /// Record an actor from the `Actors:` list. Repeats are ignored.
    pub fn declare(&mut self, actor: &Ident) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if frame.declared_names.insert(CanonicalName::new(&actor.name)) {
            frame.declared.push(actor.clone());
        }
    }

    /// Record an actor used by a step.
    pub fn mark_used(&mut self, actor: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.used.insert(CanonicalName::new(actor));
        }
    }
}
