use ratatui::prelude::*;
use ratatui_image::protocol::StatefulProtocolType;
use ratatui_image::{Resize, StatefulImage};

use crate::app::Model;

use super::CellSpan;

pub fn render_images(model: &mut Model, frame: &mut Frame, doc_area: Rect) {
    if model.image_protocols.is_empty() {
        return;
    }
    let scroll = model.viewport.offset();

    let boxes: Vec<_> = model
        .surface
        .layout()
        .object_boxes()
        .filter_map(|(_, tag, rect)| tag.map(|kind| (kind, rect)))
        .collect();

    for (kind, rect) in boxes {
        let Some((protocol, _)) = model.image_protocols.get_mut(&kind) else {
            continue;
        };
        let span = CellSpan::of(rect);
        let Some((dst, src_start)) = span.on_screen(doc_area, scroll) else {
            continue;
        };

        // Render the whole image to a temp buffer and copy the visible rows.
        let temp_area = Rect::new(0, 0, span.cols, span.rows);
        let mut temp_buf = ratatui::buffer::Buffer::empty(temp_area);
        let resize = if matches!(protocol.protocol_type(), StatefulProtocolType::Halfblocks(_)) {
            // Nearest-neighbor causes strong color aliasing artifacts in half-cell mode.
            Resize::Scale(Some(image::imageops::FilterType::CatmullRom))
        } else {
            Resize::Scale(None)
        };
        StatefulImage::default()
            .resize(resize)
            .render(temp_area, &mut temp_buf, protocol);

        let left_cut = u16::try_from((-span.col).max(0)).unwrap_or(u16::MAX);
        let frame_buf = frame.buffer_mut();
        for row in 0..dst.height {
            let src_row = src_start + row;
            if src_row >= temp_area.height {
                break;
            }
            for col in 0..dst.width {
                let src_col = left_cut + col;
                if src_col >= temp_area.width {
                    break;
                }
                frame_buf[(dst.x + col, dst.y + row)] = temp_buf[(src_col, src_row)].clone();
            }
        }
        tracing::trace!(%kind, rows = dst.height, cols = dst.width, "image blit");
    }
}
