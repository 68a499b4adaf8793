use serde::{Deserialize, Serialize};

use crate::analysis::summary::{DiameterSummary, LogSummary, SpeciesSummary, SummaryRow};
use crate::error::CruiseError;
use crate::models::{Log, Tree};
use crate::reference::Species;

/// One sample location.
///
/// A plot owns its trees and re-derives every summary table when the tree
/// list changes. Mutating a tree in place through [`Plot::tree_mut`] does
/// not refresh the tables; call [`Plot::rebuild`] afterwards. That manual
/// step is the aggregation contract, not an oversight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    number: u32,
    /// Expansion factor recorded for the plot: BAF when positive, negative
    /// inverse of the fixed plot size when negative.
    expansion_factor: f64,
    trees: Vec<Tree>,

    species_summary: SpeciesSummary,
    diameter_summary: DiameterSummary,
    log_summary: LogSummary,
    totals: SummaryRow,
}

impl Plot {
    pub fn new(number: u32, expansion_factor: f64) -> Result<Plot, CruiseError> {
        if number < 1 {
            return Err(CruiseError::Validation(format!(
                "plot number must be at least 1, got {number}"
            )));
        }
        if !expansion_factor.is_finite() {
            return Err(CruiseError::Validation(format!(
                "Plot {number}: expansion factor must be finite, got {expansion_factor}"
            )));
        }
        Ok(Plot {
            number,
            expansion_factor,
            trees: Vec::new(),
            species_summary: SpeciesSummary::default(),
            diameter_summary: DiameterSummary::default(),
            log_summary: LogSummary::default(),
            totals: SummaryRow::default(),
        })
    }

    /// Append a tree; it takes the next tree number within the plot.
    pub fn add_tree(&mut self, mut tree: Tree) {
        tree.set_number(self.trees.len() as u32 + 1);
        self.trees.push(tree);
        self.rebuild();
    }

    /// Append several trees at once, renumbering 1..n, then re-derive once.
    pub fn add_trees(&mut self, trees: Vec<Tree>) {
        for mut tree in trees {
            tree.set_number(self.trees.len() as u32 + 1);
            self.trees.push(tree);
        }
        self.rebuild();
    }

    /// Remove a tree by number, renumber the rest, and re-derive.
    pub fn remove_tree(&mut self, tree_number: u32) -> Result<Tree, CruiseError> {
        if tree_number == 0 || tree_number as usize > self.trees.len() {
            return Err(CruiseError::Validation(format!(
                "Plot {} has no tree {tree_number} (trees 1..={})",
                self.number,
                self.trees.len()
            )));
        }
        let removed = self.trees.remove(tree_number as usize - 1);
        for (i, tree) in self.trees.iter_mut().enumerate() {
            tree.set_number(i as u32 + 1);
        }
        self.rebuild();
        Ok(removed)
    }

    pub fn tree(&self, tree_number: u32) -> Option<&Tree> {
        self.trees.get(tree_number.checked_sub(1)? as usize)
    }

    /// Mutable access to a tree. Derived plot state goes stale until
    /// [`Plot::rebuild`] runs.
    pub fn tree_mut(&mut self, tree_number: u32) -> Option<&mut Tree> {
        self.trees.get_mut(tree_number.checked_sub(1)? as usize)
    }

    /// Push the plot's expansion factor down to every tree, then re-derive.
    pub fn set_expansion_factor(&mut self, expansion_factor: f64) -> Result<(), CruiseError> {
        if !expansion_factor.is_finite() {
            return Err(CruiseError::Validation(format!(
                "Plot {}: expansion factor must be finite, got {expansion_factor}",
                self.number
            )));
        }
        self.expansion_factor = expansion_factor;
        for tree in &mut self.trees {
            tree.set_plot_factor(expansion_factor)?;
        }
        self.rebuild();
        Ok(())
    }

    /// Idempotent re-derivation of every summary table from the owned trees.
    pub fn rebuild(&mut self) {
        let refs: Vec<&Tree> = self.trees.iter().collect();
        self.species_summary = SpeciesSummary::build(&refs, 1.0);
        self.diameter_summary = DiameterSummary::build(&refs, 1.0);
        let logs: Vec<&Log> = self.trees.iter().flat_map(Tree::logs).collect();
        self.log_summary = LogSummary::build(&logs, 1.0);
        self.totals = self.species_summary.totals().cloned().unwrap_or_default();
    }

    pub(crate) fn set_number(&mut self, number: u32) {
        self.number = number;
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn expansion_factor(&self) -> f64 {
        self.expansion_factor
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Species present on the plot, in reporting order.
    pub fn species(&self) -> Vec<Species> {
        self.species_summary.species()
    }

    pub fn species_summary(&self) -> &SpeciesSummary {
        &self.species_summary
    }

    pub fn diameter_summary(&self) -> &DiameterSummary {
        &self.diameter_summary
    }

    pub fn log_summary(&self) -> &LogSummary {
        &self.log_summary
    }

    /// Plot-level totals: the TOTALS row of the species summary.
    pub fn totals(&self) -> &SummaryRow {
        &self.totals
    }
}
