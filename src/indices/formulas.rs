//! Band-math formulas
//!
//! Every formula takes grids of one shape and returns a new grid of that
//! shape. Divisions go through `safe_divide`, so a zero denominator never
//! produces an infinity or NaN in an index grid.

use ndarray::Zip;

use crate::indices::errors::{IndexError, IndexResult};
use crate::raster::Grid;

/// SAVI soil brightness correction
const SAVI_L: f32 = 0.5;

/// EVI gain, aerosol coefficients and canopy background adjustment
const EVI_G: f32 = 2.5;
const EVI_C1: f32 = 6.0;
const EVI_C2: f32 = 7.5;
const EVI_L: f32 = 1.0;

/// ARVI atmospheric self-correction weight
const ARVI_GAMMA: f32 = 2.0;

/// Fails unless every grid has the shape of the first one
pub fn check_shapes(grids: &[&Grid]) -> IndexResult<()> {
    let Some(first) = grids.first() else {
        return Ok(());
    };
    let expected = first.dim();
    for grid in &grids[1..] {
        if grid.dim() != expected {
            return Err(IndexError::ShapeMismatch { expected, found: grid.dim() });
        }
    }
    Ok(())
}

/// Elementwise `a / b`, with 0 wherever `b` is 0 or the quotient is NaN
pub fn safe_divide(a: &Grid, b: &Grid) -> IndexResult<Grid> {
    check_shapes(&[a, b])?;
    Ok(Zip::from(a).and(b).map_collect(|&num, &den| {
        if den == 0.0 {
            return 0.0;
        }
        let quotient = num / den;
        if quotient.is_nan() {
            0.0
        } else {
            quotient
        }
    }))
}

/// Normalised difference `(x - y) / (x + y)`
fn normalized_difference(x: &Grid, y: &Grid) -> IndexResult<Grid> {
    check_shapes(&[x, y])?;
    safe_divide(&(x - y), &(x + y))
}

pub fn ndvi(nir: &Grid, red: &Grid) -> IndexResult<Grid> {
    normalized_difference(nir, red)
}

pub fn savi(nir: &Grid, red: &Grid) -> IndexResult<Grid> {
    check_shapes(&[nir, red])?;
    let ratio = safe_divide(&(nir - red), &(nir + red + SAVI_L))?;
    Ok(ratio * (1.0 + SAVI_L))
}

pub fn evi(nir: &Grid, red: &Grid, blue: &Grid) -> IndexResult<Grid> {
    check_shapes(&[nir, red, blue])?;
    let denominator = (nir + &(red * EVI_C1)) - &(blue * EVI_C2) + EVI_L;
    let ratio = safe_divide(&(nir - red), &denominator)?;
    Ok(ratio * EVI_G)
}

pub fn arvi(nir: &Grid, red: &Grid, blue: &Grid) -> IndexResult<Grid> {
    check_shapes(&[nir, red, blue])?;
    let red_corrected = red - &((red - blue) * ARVI_GAMMA);
    normalized_difference(nir, &red_corrected)
}

pub fn nbr(nir: &Grid, swir2: &Grid) -> IndexResult<Grid> {
    normalized_difference(nir, swir2)
}

pub fn nbwi(green: &Grid, nir: &Grid) -> IndexResult<Grid> {
    normalized_difference(green, nir)
}

pub fn ndbi(swir1: &Grid, nir: &Grid) -> IndexResult<Grid> {
    normalized_difference(swir1, nir)
}

/// Green chlorophyll index, `NIR / GREEN - 1`; -1 where GREEN is 0
pub fn gci(nir: &Grid, green: &Grid) -> IndexResult<Grid> {
    Ok(safe_divide(nir, green)? - 1.0)
}
