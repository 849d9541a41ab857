//! Named design matrices for regression models
//!
//! Columns are stored column-major (the layout the GLM fitters take) and
//! addressed by name, so a model like
//! `red_cards ~ skin_tone + games + skin_tone:games` is built by pushing
//! the main-effect columns and then the interaction.

use crate::errors::{StatsError, StatsResult};

/// A named, column-major feature matrix
#[derive(Debug, Clone, Default)]
pub struct DesignMatrix {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    n_rows: usize,
}

impl DesignMatrix {
    pub fn new(n_rows: usize) -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            n_rows,
        }
    }

    /// Add a main-effect column
    pub fn push(&mut self, name: &str, values: Vec<f64>) -> StatsResult<()> {
        if values.len() != self.n_rows {
            return Err(StatsError::DimensionMismatchMsg(format!(
                "Column '{}' has {} rows, expected {}",
                name,
                values.len(),
                self.n_rows
            )));
        }
        if self.position(name).is_some() {
            return Err(StatsError::InvalidInput(format!(
                "Duplicate column name '{}'",
                name
            )));
        }
        self.names.push(name.to_string());
        self.columns.push(values);
        Ok(())
    }

    /// Add the element-wise product of two existing columns, named `a:b`
    pub fn interaction(&mut self, a: &str, b: &str) -> StatsResult<()> {
        let ia = self
            .position(a)
            .ok_or_else(|| StatsError::InvalidInput(format!("Unknown column '{}'", a)))?;
        let ib = self
            .position(b)
            .ok_or_else(|| StatsError::InvalidInput(format!("Unknown column '{}'", b)))?;

        let product: Vec<f64> = self.columns[ia]
            .iter()
            .zip(self.columns[ib].iter())
            .map(|(x, y)| x * y)
            .collect();
        self.push(&format!("{}:{}", a, b), product)
    }

    /// Index of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Column-major data, in the shape the GLM fitters accept
    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}
