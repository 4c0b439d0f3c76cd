use super::{DatasetBase, DatasetError, DesignMatrix, Result};
use crate::Float;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// This implementation block provides the validated constructors and the
/// getters of the dataset.
impl<F: Float> DatasetBase<F> {
    /// This method instantiates a new dataset from a design matrix and targets.
    /// It fails if the matrix has no rows or no columns, if the number of
    /// targets differs from the number of rows or if any value is not finite.
    pub fn new(design_matrix: Array2<F>, targets: Array1<F>) -> Result<DatasetBase<F>> {
        if design_matrix.n_samples() == 0 {
            return Err(DatasetError::Empty);
        }
        if design_matrix.n_features() == 0 {
            return Err(DatasetError::NoFeatures);
        }
        if design_matrix.n_samples() != targets.len() {
            return Err(DatasetError::TargetMismatch {
                rows: design_matrix.n_samples(),
                targets: targets.len(),
            });
        }
        if design_matrix.iter().any(|x| !x.is_finite()) {
            return Err(DatasetError::NonFinite("X"));
        }
        if targets.iter().any(|y| !y.is_finite()) {
            return Err(DatasetError::NonFinite("y"));
        }
        Ok(DatasetBase {
            design_matrix,
            targets,
        })
    }

    /// This method builds a dataset from row-major nested sequences, the shape
    /// in which feature matrices arrive over the wire.
    pub fn from_rows(rows: &[Vec<F>], targets: Vec<F>) -> Result<DatasetBase<F>> {
        let n_features = match rows.first() {
            Some(first) => first.len(),
            None => return Err(DatasetError::Empty),
        };
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != n_features)
        {
            return Err(DatasetError::RaggedRow {
                row,
                expected: n_features,
                found,
            });
        }
        let flat: Vec<F> = rows.iter().flatten().copied().collect();
        let design_matrix = Array2::from_shape_vec((rows.len(), n_features), flat)
            .map_err(|_| DatasetError::NoFeatures)?;
        DatasetBase::new(design_matrix, Array1::from_vec(targets))
    }

    /// This method is a getter for the targets.
    pub fn targets(&self) -> ArrayView1<F> {
        self.targets.view()
    }

    /// This method is a getter for the design matrix.
    pub fn design_matrix(&self) -> ArrayView2<F> {
        self.design_matrix.view()
    }

    /// This method returns the `j`-th feature column.
    pub fn feature(&self, j: usize) -> ArrayView1<F> {
        self.design_matrix.index_axis(Axis(1), j)
    }

    pub fn n_samples(&self) -> usize {
        self.design_matrix.n_samples()
    }

    pub fn n_features(&self) -> usize {
        self.design_matrix.n_features()
    }
}

/// This implementation block provides a method for the creation of datasets
/// from dense matrices.
impl<F: Float> TryFrom<(Array2<F>, Array1<F>)> for DatasetBase<F> {
    type Error = DatasetError;

    fn try_from(data: (Array2<F>, Array1<F>)) -> Result<Self> {
        DatasetBase::new(data.0, data.1)
    }
}
