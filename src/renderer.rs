use crate::simulation::Cell;

/// Receives cell-state changes from the engine and controller.
///
/// The engine only ever emits; it never reads rendering state back. Each
/// event fires once per actual state change, so implementations can create
/// and destroy visuals without deduplicating.
pub trait Renderer {
    fn on_ignite(&mut self, cell: Cell);

    fn on_extinguish(&mut self, cell: Cell);

    /// Called only when the highlighted cell changes, never to repeat the
    /// current one. `None` hides the highlight.
    fn on_highlight_move(&mut self, cell: Option<Cell>);
}

/// Renderer event, as captured by [`RecordingRenderer`]
#[cfg(test)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RenderEvent {
    Ignite(Cell),
    Extinguish(Cell),
    Highlight(Option<Cell>),
}

/// Test double that records every event it receives
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub events: Vec<RenderEvent>,
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn ignited(&self) -> Vec<Cell> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::Ignite(cell) => Some(*cell),
                _ => None,
            })
            .collect()
    }

    pub fn last_highlight(&self) -> Option<Option<Cell>> {
        self.events.iter().rev().find_map(|e| match e {
            RenderEvent::Highlight(cell) => Some(*cell),
            _ => None,
        })
    }
}

#[cfg(test)]
impl Renderer for RecordingRenderer {
    fn on_ignite(&mut self, cell: Cell) {
        self.events.push(RenderEvent::Ignite(cell));
    }

    fn on_extinguish(&mut self, cell: Cell) {
        self.events.push(RenderEvent::Extinguish(cell));
    }

    fn on_highlight_move(&mut self, cell: Option<Cell>) {
        self.events.push(RenderEvent::Highlight(cell));
    }
}
