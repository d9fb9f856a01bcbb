//! Distributor: get the input rows every rank needs onto that rank.
//!
//! `Broadcast` replicates the whole image to every rank, trading memory for
//! a protocol without halo bookkeeping. `Halo` scatters to each rank its
//! span plus one neighbour row on each side. Both produce the same filtered
//! output because a rank never reads further than one row outside its span.
use super::comm::Communicator;
use crate::error::{Result, StencilError};
use crate::image::{ImageView, PixelBuffer, RowWindow};
use crate::partition::RangePartitioner;
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    #[default]
    Broadcast,
    Halo,
}

/// Image header exchanged before any pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    pub data_size: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageHeader {
    const LEN: usize = 12;

    fn of(image: &PixelBuffer) -> Result<Self> {
        let (w, h) = image.dims();
        Ok(Self {
            data_size: to_u32(image.as_bytes().len(), "data size")?,
            width: to_u32(w, "width")?,
            height: to_u32(h, "height")?,
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::LEN);
        out.extend_from_slice(&self.data_size.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let words = decode_words::<3>(bytes, "image header")?;
        Ok(Self {
            data_size: words[0],
            width: words[1],
            height: words[2],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width as usize
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height as usize
    }
}

fn to_u32(v: usize, what: &str) -> Result<u32> {
    u32::try_from(v)
        .map_err(|_| StencilError::Communication(format!("{what} {v} does not fit in 32 bits")))
}

fn decode_words<const N: usize>(bytes: &[u8], what: &str) -> Result<[u32; N]> {
    if bytes.len() < N * 4 {
        return Err(StencilError::Communication(format!(
            "{what} truncated: {} bytes, need {}",
            bytes.len(),
            N * 4
        )));
    }
    let mut words = [0u32; N];
    for (i, word) in words.iter_mut().enumerate() {
        let mut b = [0u8; 4];
        b.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
        *word = u32::from_le_bytes(b);
    }
    Ok(words)
}

/// Rows a rank needs to hold to filter `span`: the span plus one halo row
/// on each side, clipped to the image.
pub fn halo_rows(span: Range<usize>, height: usize) -> Range<usize> {
    if span.start >= span.end {
        return 0..0;
    }
    span.start.saturating_sub(1)..(span.end + 1).min(height)
}

pub struct Distributor<'c, C: Communicator> {
    comm: &'c C,
    mode: DistributionMode,
}

impl<'c, C: Communicator> Distributor<'c, C> {
    pub fn new(comm: &'c C, mode: DistributionMode) -> Self {
        Self { comm, mode }
    }

    /// Collective: share the image header. Only the coordinator passes the
    /// image.
    pub fn share_header(&self, image: Option<&PixelBuffer>) -> Result<ImageHeader> {
        let payload = if self.comm.is_coordinator() {
            Some(ImageHeader::of(coordinator_image(image)?)?.encode())
        } else {
            None
        };
        ImageHeader::decode(&self.comm.broadcast(payload)?)
    }

    /// Collective: deliver the rows each rank needs.
    ///
    /// `partitioner` must be the row partitioner all ranks derived from
    /// `header`.
    pub fn distribute(
        &self,
        header: ImageHeader,
        image: Option<&PixelBuffer>,
        partitioner: &RangePartitioner,
    ) -> Result<RowWindow> {
        let width = header.width();
        let height = header.height();
        let window = match self.mode {
            DistributionMode::Broadcast => {
                let payload = if self.comm.is_coordinator() {
                    Some(coordinator_image(image)?.as_bytes().to_vec())
                } else {
                    None
                };
                let data = self.comm.broadcast(payload)?;
                if data.len() != header.data_size as usize {
                    return Err(StencilError::Communication(format!(
                        "broadcast delivered {} bytes, header announced {}",
                        data.len(),
                        header.data_size
                    )));
                }
                RowWindow::full(PixelBuffer::from_raw(width, height, data)?)
            }
            DistributionMode::Halo => {
                let payloads: Option<Vec<Vec<u8>>> = if self.comm.is_coordinator() {
                    let image = coordinator_image(image)?;
                    Some(
                        partitioner
                            .spans()
                            .map(|span| {
                                let rows = halo_rows(span.start..span.end, height);
                                encode_window(rows.start, image.rows_bytes(rows))
                            })
                            .collect(),
                    )
                } else {
                    None
                };
                let bytes = self.comm.scatter(payloads)?;
                let [first_row] = decode_words::<1>(&bytes, "window header")?;
                RowWindow::new(width, height, first_row as usize, bytes[4..].to_vec())?
            }
        };
        debug!(
            "rank {} holds rows {:?} of {}x{} ({:?})",
            self.comm.rank(),
            window.held_rows(),
            window.width(),
            window.height(),
            self.mode
        );
        Ok(window)
    }
}

fn coordinator_image(image: Option<&PixelBuffer>) -> Result<&PixelBuffer> {
    image.ok_or_else(|| {
        StencilError::Communication("coordinator has no image to distribute".to_string())
    })
}

fn encode_window(first_row: usize, rows: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + rows.len());
    out.extend_from_slice(&(first_row as u32).to_le_bytes());
    out.extend_from_slice(rows);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::LocalWorld;

    #[test]
    fn header_round_trips_through_bytes() {
        let img = PixelBuffer::new(7, 3);
        let header = ImageHeader::of(&img).unwrap();
        assert_eq!(ImageHeader::decode(&header.encode()).unwrap(), header);
        assert_eq!(header.data_size, 84);
        assert!(ImageHeader::decode(&[0; 11]).is_err());
    }

    #[test]
    fn halo_rows_are_clipped() {
        assert_eq!(halo_rows(0..3, 10), 0..4);
        assert_eq!(halo_rows(3..6, 10), 2..7);
        assert_eq!(halo_rows(6..10, 10), 5..10);
        assert_eq!(halo_rows(4..4, 10), 0..0);
    }

    #[test]
    fn halo_windows_hold_span_and_neighbours() {
        let img = PixelBuffer::from_fn(3, 9, |x, y| [x as u8, y as u8, 0, 255]);
        let world = LocalWorld::new(3).unwrap();
        let windows = world
            .run(|comm| {
                let d = Distributor::new(comm, DistributionMode::Halo);
                let image = comm.is_coordinator().then_some(&img);
                let header = d.share_header(image)?;
                let p = RangePartitioner::new(header.height(), comm.size())?;
                d.distribute(header, image, &p)
            })
            .unwrap();
        assert_eq!(windows[0].held_rows(), 0..4);
        assert_eq!(windows[1].held_rows(), 2..7);
        assert_eq!(windows[2].held_rows(), 5..9);
        assert_eq!(windows[1].pixel(2, 6), [2, 6, 0, 255]);
    }

    #[test]
    fn broadcast_replicates_the_image() {
        let img = PixelBuffer::from_fn(4, 4, |x, y| [(x + y) as u8, 1, 2, 3]);
        let world = LocalWorld::new(2).unwrap();
        let windows = world
            .run(|comm| {
                let d = Distributor::new(comm, DistributionMode::Broadcast);
                let image = comm.is_coordinator().then_some(&img);
                let header = d.share_header(image)?;
                let p = RangePartitioner::new(header.height(), comm.size())?;
                d.distribute(header, image, &p)
            })
            .unwrap();
        for w in &windows {
            assert_eq!(w.held_rows(), 0..4);
            assert_eq!(w.copy_rows(0..4), img.as_bytes());
        }
    }
}
