//! Band file inspection command

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::ArgMatches;
use log::debug;

use crate::batch::errors::{BatchError, BatchResult};
use crate::commands::command_traits::Command;
use crate::raster::store::read_profile;
use crate::tiff::TiffReader;

/// Prints the structure and profile of one band file
pub struct InspectCommand {
    path: PathBuf,
}

impl InspectCommand {
    pub fn new(args: &ArgMatches) -> BatchResult<Self> {
        let path = args.get_one::<String>("inspect")
            .ok_or_else(|| BatchError::ConfigError("Missing file to inspect".to_string()))?;
        Ok(InspectCommand { path: PathBuf::from(path) })
    }

    /// Report text for the file
    pub fn render(&self) -> BatchResult<String> {
        debug!("Inspecting {}", self.path.display());
        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut tiff = TiffReader::new();
        let ifd = tiff.read(&mut reader)?;
        let profile = read_profile(&mut reader, &tiff, &ifd)?;

        Ok(format!(
            "File: {}\nFormat: {}, {}\n{}{}\n",
            self.path.display(),
            if tiff.is_big_tiff() { "BigTIFF" } else { "TIFF" },
            tiff.byte_order()?.name(),
            ifd,
            profile
        ))
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> BatchResult<()> {
        print!("{}", self.render()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;
    use crate::raster::{BandStore, GeoReference, GeoTiffBandStore, Grid, Profile, SampleType};

    #[test]
    fn test_render_band_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("B4.tif");
        let profile = Profile {
            width: 3,
            height: 2,
            count: 1,
            dtype: SampleType::F32,
            nodata: None,
            geo: GeoReference {
                geo_key_directory: Some(vec![1, 1, 0, 1, 2048, 0, 1, 4326]),
                ..GeoReference::default()
            },
        };
        GeoTiffBandStore::new("zstd").unwrap()
            .save_grid(&Grid::zeros((2, 3)), &profile, &path)
            .unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let args = build_cli().get_matches_from(["spectrakit", "--inspect", path_arg.as_str()]);
        let text = InspectCommand::new(&args).unwrap().render().unwrap();

        assert!(text.contains("Format: TIFF, Little Endian (II)"));
        assert!(text.contains("Dimensions: 3x2"));
        assert!(text.contains("Size: 3x2 (1 band(s), float32)"));
        assert!(text.contains("CRS: EPSG:4326"));
        assert!(text.contains("NoData: none"));
    }
}
