use nalgebra::{Matrix3, Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum BoxError {
    #[error("Box matrix must be lower triangular, but element [{row}][{col}] is {value}")]
    NotLowerTriangular { row: usize, col: usize, value: f64 },
    #[error("Box vector {axis} has a negative diagonal element ({value})")]
    NegativeDiagonal { axis: usize, value: f64 },
    #[error("Box vector {axis} is non-periodic but has a non-zero element ({value})")]
    OpenAxisNotZero { axis: usize, value: f64 },
    #[error("Box matrix contains a non-finite element")]
    NonFinite,
}

/// The periodic simulation cell.
///
/// Rows of the matrix are the box vectors `a`, `b`, `c`, in the usual lower-triangular
/// convention (`a` along x, `b` in the xy plane). A zero diagonal element disables
/// periodicity along that axis; the all-zero box describes a non-periodic system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationBox {
    vectors: Matrix3<f64>,
    triclinic: bool,
}

impl Default for SimulationBox {
    fn default() -> Self {
        Self::none()
    }
}

impl SimulationBox {
    /// A box without periodic boundaries.
    pub fn none() -> Self {
        Self {
            vectors: Matrix3::zeros(),
            triclinic: false,
        }
    }

    /// A rectangular box with edge lengths `x`, `y`, `z`.
    pub fn rectangular(x: f64, y: f64, z: f64) -> Result<Self, BoxError> {
        Self::triclinic(Matrix3::from_diagonal(&Vector3::new(x, y, z)))
    }

    /// A general box from its row-vector matrix.
    ///
    /// # Errors
    ///
    /// The matrix must be finite, lower triangular and have non-negative diagonal.
    /// A row with a zero diagonal element must be zero throughout.
    pub fn triclinic(vectors: Matrix3<f64>) -> Result<Self, BoxError> {
        if vectors.iter().any(|v| !v.is_finite()) {
            return Err(BoxError::NonFinite);
        }
        for (row, col) in [(0, 1), (0, 2), (1, 2)] {
            let value = vectors[(row, col)];
            if value != 0.0 {
                return Err(BoxError::NotLowerTriangular { row, col, value });
            }
        }
        for axis in 0..3 {
            let value = vectors[(axis, axis)];
            if value < 0.0 {
                return Err(BoxError::NegativeDiagonal { axis, value });
            }
            if value == 0.0 {
                if let Some(&value) = vectors.row(axis).iter().find(|v| **v != 0.0) {
                    return Err(BoxError::OpenAxisNotZero { axis, value });
                }
            }
        }
        let triclinic = [(1, 0), (2, 0), (2, 1)]
            .iter()
            .any(|&(row, col)| vectors[(row, col)] != 0.0);
        Ok(Self { vectors, triclinic })
    }

    /// Convenience constructor from row arrays, as found in configuration files.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Result<Self, BoxError> {
        Self::triclinic(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.vectors
    }

    #[inline]
    pub fn vector(&self, axis: usize) -> Vector3<f64> {
        self.vectors.row(axis).transpose()
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        (0..3).any(|axis| self.vectors[(axis, axis)] > 0.0)
    }

    #[inline]
    pub fn is_triclinic(&self) -> bool {
        self.triclinic
    }

    /// Cell volume; zero when any axis is non-periodic.
    pub fn volume(&self) -> f64 {
        self.vectors[(0, 0)] * self.vectors[(1, 1)] * self.vectors[(2, 2)]
    }

    /// Reduces a displacement vector to its minimum image.
    ///
    /// The vector is first wrapped into the cell brick starting from the last box
    /// vector, so that lattice translations of any size are removed. Triclinic cells
    /// then compare the neighbouring images, since the brick reduction alone is not
    /// guaranteed to give the shortest vector there.
    pub fn minimum_image(&self, dx: Vector3<f64>) -> Vector3<f64> {
        let mut d = dx;
        for axis in (0..3).rev() {
            let length = self.vectors[(axis, axis)];
            if length > 0.0 {
                let shift = (d[axis] / length).round();
                if shift != 0.0 {
                    d -= self.vector(axis) * shift;
                }
            }
        }

        if !self.triclinic {
            return d;
        }

        let mut best = d;
        let mut best_norm = d.norm_squared();
        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    if i == 0 && j == 0 && k == 0 {
                        continue;
                    }
                    let candidate = d
                        + self.vector(0) * i as f64
                        + self.vector(1) * j as f64
                        + self.vector(2) * k as f64;
                    let norm = candidate.norm_squared();
                    if norm < best_norm {
                        best = candidate;
                        best_norm = norm;
                    }
                }
            }
        }
        best
    }

    /// Minimum-image displacement `a - b`.
    #[inline]
    pub fn pbc_dx(&self, a: &Point3<f64>, b: &Point3<f64>) -> Vector3<f64> {
        self.minimum_image(a - b)
    }
}
