use ndarray::{Axis, IxDyn};

use crate::error::FWIError;

use super::Grid;

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub units: Option<String>,
    pub data: Grid,
}

/// Ordered collection of named grids sharing the same shape.
///
/// The shape is fixed by the first variable inserted. Variables keep their
/// insertion order, so appended fields come after the original ones.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    shape: Option<Vec<usize>>,
    variables: Vec<Variable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(&self) -> Option<&[usize]> {
        self.shape.as_deref()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Grid> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| &v.data)
    }

    pub fn units(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .and_then(|v| v.units.as_deref())
    }

    /// Get a variable or fail with a message naming it.
    pub fn require(&self, name: &str) -> Result<&Grid, FWIError> {
        self.get(name)
            .ok_or_else(|| format!("variable {name} not found in dataset").into())
    }

    /// Insert a variable, replacing any variable with the same name in place.
    pub fn insert(
        &mut self,
        name: &str,
        units: Option<&str>,
        data: Grid,
    ) -> Result<(), FWIError> {
        match &self.shape {
            Some(shape) if shape.as_slice() != data.shape() => {
                return Err(format!(
                    "variable {name} has shape {:?}, dataset shape is {:?}",
                    data.shape(),
                    shape
                )
                .into());
            }
            Some(_) => (),
            None => self.shape = Some(data.shape().to_vec()),
        }

        let variable = Variable {
            name: name.to_string(),
            units: units.map(|u| u.to_string()),
            data,
        };
        match self.variables.iter_mut().find(|v| v.name == name) {
            Some(existing) => *existing = variable,
            None => self.variables.push(variable),
        }
        Ok(())
    }

    pub fn with_variable(
        mut self,
        name: &str,
        units: Option<&str>,
        data: Grid,
    ) -> Result<Self, FWIError> {
        self.insert(name, units, data)?;
        Ok(self)
    }

    pub fn remove(&mut self, name: &str) -> Option<Grid> {
        let position = self.variables.iter().position(|v| v.name == name)?;
        let variable = self.variables.remove(position);
        if self.variables.is_empty() {
            self.shape = None;
        }
        Some(variable.data)
    }

    /// Number of steps along the given axis (e.g. the time axis).
    pub fn axis_len(&self, axis: usize) -> Option<usize> {
        self.shape.as_ref().and_then(|s| s.get(axis).copied())
    }

    /// A new dataset with every variable sliced at `index` along `axis`.
    pub fn index_axis(&self, axis: usize, index: usize) -> Result<Dataset, FWIError> {
        let len = self
            .axis_len(axis)
            .ok_or_else(|| format!("dataset has no axis {axis}"))?;
        if index >= len {
            return Err(format!("index {index} out of bounds for axis of length {len}").into());
        }
        let mut sliced = Dataset::new();
        for variable in &self.variables {
            let data = variable.data.index_axis(Axis(axis), index).to_owned();
            sliced.insert(&variable.name, variable.units.as_deref(), data)?;
        }
        Ok(sliced)
    }
}

/// A grid of the given shape filled with a constant.
pub fn filled(shape: &[usize], value: f32) -> Grid {
    Grid::from_elem(IxDyn(shape), value)
}
