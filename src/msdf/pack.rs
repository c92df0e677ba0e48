// Copyright 2017 The Servo Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Stage 4: shelf packing of rendered glyph bitmaps into one atlas canvas.

/// Where a rect ended up, or `None` if it couldn't be placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

pub struct PackResult {
    pub placements: Vec<Option<Placement>>,
    pub width: u32,
    pub height: u32,
}

struct Shelf {
    y: u32,
    height: u32,
    used_width: u32,
}

/// Packs `rects` (width, height pairs) into shelves, sorting by height
/// descending first (a stable sort, so equal-height rects keep their
/// original relative order). A rect that doesn't fit any existing shelf
/// opens a new one at the current total height; a rect too wide or tall
/// for `max_width`/`max_height` is left unplaced rather than erroring.
pub fn shelf_pack(rects: &[(u32, u32)], max_width: u32, max_height: u32) -> PackResult {
    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by(|&a, &b| rects[b].1.cmp(&rects[a].1));

    let mut placements: Vec<Option<Placement>> = vec![None; rects.len()];
    let mut shelves: Vec<Shelf> = Vec::new();
    let mut total_height = 0u32;
    let mut used_width = 0u32;

    for index in order {
        let (w, h) = rects[index];
        if w > max_width || h > max_height {
            continue;
        }

        let mut placed = false;
        for shelf in shelves.iter_mut() {
            if shelf.used_width + w <= max_width {
                placements[index] = Some(Placement { x: shelf.used_width, y: shelf.y });
                shelf.used_width += w;
                used_width = used_width.max(shelf.used_width);
                placed = true;
                break;
            }
        }

        if !placed {
            if total_height + h > max_height {
                continue;
            }
            placements[index] = Some(Placement { x: 0, y: total_height });
            used_width = used_width.max(w);
            shelves.push(Shelf { y: total_height, height: h, used_width: w });
            total_height += h;
        }
    }

    let width = used_width.max(1).next_power_of_two();
    let height = total_height.max(1).next_power_of_two();

    PackResult { placements, width, height }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_three_rects_into_two_shelves() {
        let rects = [(10, 20), (10, 20), (10, 10)];
        let result = shelf_pack(&rects, 20, 40);

        assert_eq!(result.placements[0], Some(Placement { x: 0, y: 0 }));
        assert_eq!(result.placements[1], Some(Placement { x: 10, y: 0 }));
        assert_eq!(result.placements[2], Some(Placement { x: 0, y: 20 }));

        assert_eq!(result.width, 32);
        assert_eq!(result.height, 32);
    }

    #[test]
    fn oversized_rect_is_left_unplaced() {
        let rects = [(50, 50)];
        let result = shelf_pack(&rects, 20, 20);
        assert_eq!(result.placements[0], None);
    }

    #[test]
    fn equal_height_rects_keep_relative_order_on_a_shared_shelf() {
        let rects = [(5, 10), (5, 10), (5, 10)];
        let result = shelf_pack(&rects, 15, 10);
        assert_eq!(result.placements[0], Some(Placement { x: 0, y: 0 }));
        assert_eq!(result.placements[1], Some(Placement { x: 5, y: 0 }));
        assert_eq!(result.placements[2], Some(Placement { x: 10, y: 0 }));
    }

    quickcheck! {
        fn placed_rects_dont_overlap(sizes: Vec<(u32, u32)>) -> bool {
            let rects: Vec<(u32, u32)> = sizes
                .into_iter()
                .map(|(w, h)| (w % 64 + 1, h % 64 + 1))
                .collect();
            let result = shelf_pack(&rects, 256, 256);

            let placed: Vec<(Placement, u32, u32)> = result
                .placements
                .iter()
                .zip(&rects)
                .filter_map(|(p, &(w, h))| p.map(|p| (p, w, h)))
                .collect();

            for (i, &(a, aw, ah)) in placed.iter().enumerate() {
                for &(b, bw, bh) in &placed[(i + 1)..] {
                    let separate = a.x + aw <= b.x || b.x + bw <= a.x || a.y + ah <= b.y || b.y + bh <= a.y;
                    if !separate {
                        return false;
                    }
                }
            }
            true
        }
    }
}
