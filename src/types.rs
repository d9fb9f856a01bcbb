use crate::diagnostics::FilterReport;
use crate::image::PixelBuffer;

/// Filtered image together with the report of the run that produced it.
#[derive(Clone, Debug)]
pub struct FilterOutput {
    pub image: PixelBuffer,
    pub report: FilterReport,
}
