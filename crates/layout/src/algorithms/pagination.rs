use std::ops::Range;

/// Use a small epsilon to handle floating point inaccuracies
const EPSILON: f32 = 0.01;

pub struct BreakAnalysis {
    pub should_break: bool,
    pub remaining_height: f32,
}

/// Centralized logic to check if the next block fits in the remaining space.
///
/// * `used`: content height already placed on the page (blocks and gaps).
/// * `gap`: spacing inserted before the block; zero for the first block.
/// * `block_height`: the block's measured height.
/// * `available`: the page's available content height.
pub fn check_block_fit(used: f32, gap: f32, block_height: f32, available: f32) -> BreakAnalysis {
    let remaining = (available - used).max(0.0);
    BreakAnalysis {
        should_break: gap + block_height > remaining + EPSILON,
        remaining_height: remaining,
    }
}

/// One packed page: a contiguous range of block indices.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedPage {
    pub blocks: Range<usize>,
    /// Σ block heights + gap × (count − 1).
    pub content_height: f32,
    /// True when the page holds a single block taller than its available height.
    pub overflow: bool,
}

/// Greedy packing of `heights` into pages.
///
/// `available(page_index, is_last)` returns the content height available on
/// a page. Packing first assumes no page is the last one; afterwards the final
/// page is re-checked with `is_last = true` and, if it no longer fits, its
/// trailing blocks move onto a new final page.
///
/// Every page receives at least one block; a block taller than the available
/// height is placed alone and the page is flagged as overflowing.
pub fn pack_heights<F>(heights: &[f32], gap: f32, available: F) -> Vec<PackedPage>
where
    F: Fn(usize, bool) -> f32,
{
    let mut pages: Vec<PackedPage> = Vec::new();
    let mut start = 0;
    let mut used = 0.0f32;

    for (i, &height) in heights.iter().enumerate() {
        if i == start {
            used = height;
            continue;
        }
        let limit = available(pages.len(), false);
        if check_block_fit(used, gap, height, limit).should_break {
            pages.push(close_page(start..i, used, limit));
            start = i;
            used = height;
        } else {
            used += gap + height;
        }
    }
    if start < heights.len() {
        let limit = available(pages.len(), false);
        pages.push(close_page(start..heights.len(), used, limit));
    }

    settle_last_page(&mut pages, heights, gap, &available);
    pages
}

fn close_page(blocks: Range<usize>, content_height: f32, available: f32) -> PackedPage {
    PackedPage {
        overflow: blocks.len() == 1 && content_height > available + EPSILON,
        blocks,
        content_height,
    }
}

/// Re-checks the final page against its last-page allowance (for instance a
/// footer shown only on the last page) and splits it if needed.
fn settle_last_page<F>(pages: &mut Vec<PackedPage>, heights: &[f32], gap: f32, available: &F)
where
    F: Fn(usize, bool) -> f32,
{
    while let Some(last) = pages.last().cloned() {
        let index = pages.len() - 1;
        let limit = available(index, true);
        if last.content_height <= limit + EPSILON || last.blocks.len() == 1 {
            if let Some(page) = pages.last_mut() {
                page.overflow = last.blocks.len() == 1 && last.content_height > limit + EPSILON;
            }
            return;
        }

        // Keep as many leading blocks as fit with the non-final allowance and
        // carry the rest to a new final page.
        let keep_limit = available(index, false);
        let mut keep_end = last.blocks.start + 1;
        let mut kept = heights[last.blocks.start];
        while keep_end < last.blocks.end - 1 {
            let next = heights[keep_end];
            if check_block_fit(kept, gap, next, keep_limit).should_break {
                break;
            }
            kept += gap + next;
            keep_end += 1;
        }
        let carried = keep_end..last.blocks.end;
        let carried_height = span_height(&heights[carried.clone()], gap);

        pages.pop();
        pages.push(close_page(last.blocks.start..keep_end, kept, keep_limit));
        pages.push(PackedPage { blocks: carried, content_height: carried_height, overflow: false });
    }
}

fn span_height(heights: &[f32], gap: f32) -> f32 {
    let sum: f32 = heights.iter().sum();
    sum + gap * heights.len().saturating_sub(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pages: &[PackedPage]) -> Vec<usize> {
        pages.iter().map(|p| p.blocks.len()).collect()
    }

    #[test]
    fn ten_blocks_of_100_in_350_pack_three_three_three_one() {
        let heights = vec![100.0; 10];
        let pages = pack_heights(&heights, 10.0, |_, _| 350.0);
        assert_eq!(counts(&pages), vec![3, 3, 3, 1]);
        assert!((pages[0].content_height - 320.0).abs() < 0.001);
        assert!(pages.iter().all(|p| !p.overflow));
    }

    #[test]
    fn empty_input_gives_no_pages() {
        assert!(pack_heights(&[], 10.0, |_, _| 350.0).is_empty());
    }

    #[test]
    fn oversized_block_is_placed_alone_and_flagged() {
        let pages = pack_heights(&[50.0, 500.0, 50.0], 10.0, |_, _| 350.0);
        assert_eq!(counts(&pages), vec![1, 1, 1]);
        assert!(!pages[0].overflow);
        assert!(pages[1].overflow);
        assert!(!pages[2].overflow);
    }

    #[test]
    fn exact_fit_does_not_break() {
        // 3 * 110 + 2 * 10 = 350
        let pages = pack_heights(&[110.0, 110.0, 110.0], 10.0, |_, _| 350.0);
        assert_eq!(counts(&pages), vec![3]);
    }

    #[test]
    fn first_page_allowance_can_differ() {
        let pages = pack_heights(&[100.0; 6], 10.0, |i, _| if i == 0 { 220.0 } else { 350.0 });
        assert_eq!(counts(&pages), vec![2, 3, 1]);
    }

    #[test]
    fn last_page_reservation_moves_trailing_blocks() {
        // Without the last-page reservation 3 blocks fit (320 <= 350);
        // with a 60pt footer only 290 is left, so the third block moves.
        let pages = pack_heights(&[100.0; 3], 10.0, |_, is_last| if is_last { 290.0 } else { 350.0 });
        assert_eq!(counts(&pages), vec![2, 1]);
        let blocks: Vec<usize> = pages.iter().flat_map(|p| p.blocks.clone()).collect();
        assert_eq!(blocks, vec![0, 1, 2]);
    }

    #[test]
    fn check_block_fit_reports_remaining_space() {
        let analysis = check_block_fit(200.0, 10.0, 100.0, 350.0);
        assert!(!analysis.should_break);
        assert_eq!(analysis.remaining_height, 150.0);
        assert!(check_block_fit(300.0, 10.0, 100.0, 350.0).should_break);
    }
}
