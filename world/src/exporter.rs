//! Read-only views over the grid and agent for external readers.

use antlife_core::{AgentView, CellsView, AGENT_VIEW_LEN};

use crate::{agent::Agent, grid::Grid};

/// Agent words and generation stamp republished once per committed tick.
///
/// Cell codes are not mirrored: the cells view borrows the grid's live
/// storage, which alternates between the two generation buffers.
#[derive(Clone, Debug)]
pub(crate) struct Exporter {
    agent_words: [u32; AGENT_VIEW_LEN],
    generation: u64,
}

impl Exporter {
    pub(crate) fn new(agent: &Agent) -> Self {
        let mut exporter = Self {
            agent_words: [0; AGENT_VIEW_LEN],
            generation: 0,
        };
        exporter.refresh(agent, 0);
        exporter
    }

    pub(crate) fn refresh(&mut self, agent: &Agent, generation: u64) {
        self.agent_words = [agent.row(), agent.column(), agent.direction().code()];
        self.generation = generation;
    }

    pub(crate) fn cells_view<'a>(&self, grid: &'a Grid) -> CellsView<'a> {
        CellsView::new(grid.codes(), grid.width(), grid.height(), self.generation)
    }

    pub(crate) fn agent_view<'a>(&'a self, grid: &Grid) -> AgentView<'a> {
        AgentView::new(&self.agent_words, grid.width(), grid.height(), self.generation)
    }
}
