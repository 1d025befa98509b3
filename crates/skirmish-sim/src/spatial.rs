//! Uniform-grid broad phase.
//!
//! One index per body category, owned by the engine and rebuilt every tick
//! with `clear` → `add`* → `finish`. The grid covers the infinite plane by
//! hashing cell coordinates into a fixed power-of-two table, so distant
//! bodies may share a bucket; every query exact-tests what it returns.
//!
//! Toroidal spaces are handled on the query side: bodies are inserted once
//! at their wrapped position and queries are repeated once per wrap tile
//! their bounding box touches.

use glam::DVec2;
use skirmish_core::types::GovernmentId;

/// Restrictions on a line query.
#[derive(Debug, Clone, Copy)]
pub struct LineFilter<K> {
    /// Only this body may be hit (phasing weapons).
    pub only: Option<K>,
    /// This body is never hit (the shooter).
    pub exclude: Option<K>,
    /// Bodies of this government are never hit.
    pub exclude_government: Option<GovernmentId>,
}

impl<K> Default for LineFilter<K> {
    fn default() -> Self {
        Self {
            only: None,
            exclude: None,
            exclude_government: None,
        }
    }
}

/// A body whose mask the query segment enters, and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<K> {
    pub key: K,
    /// Position along the segment in `[0, 1]` where the mask is first touched.
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    position: DVec2,
    radius: f64,
    government: Option<GovernmentId>,
}

/// Grid index over bodies keyed by `K`.
#[derive(Debug, Clone)]
pub struct SpatialIndex<K> {
    cell_size: f64,
    cells: usize,
    wrap: Option<f64>,
    tick: u64,
    entries: Vec<Entry<K>>,
    /// (bucket, entry) pairs in insertion order.
    inserts: Vec<(u32, u32)>,
    /// Bucket start offsets into `sorted`, one extra slot at the end.
    starts: Vec<u32>,
    sorted: Vec<u32>,
    finished: bool,
    max_radius: f64,
    /// Per-entry stamp deduplicating bodies that span several cells.
    seen: Vec<u32>,
    stamp: u32,
}

impl<K: Copy + PartialEq> SpatialIndex<K> {
    /// `cells` is rounded up to a power of two.
    pub fn new(cell_size: f64, cells: usize) -> Self {
        let cells = cells.max(1).next_power_of_two();
        Self {
            cell_size: cell_size.max(1.0),
            cells,
            wrap: None,
            tick: 0,
            entries: Vec::new(),
            inserts: Vec::new(),
            starts: vec![0; cells * cells + 1],
            sorted: Vec::new(),
            finished: false,
            max_radius: 0.0,
            seen: Vec::new(),
            stamp: 0,
        }
    }

    /// Make queries tile across a toroidal space of the given period.
    pub fn with_wrap(mut self, period: f64) -> Self {
        self.wrap = (period > 0.0).then_some(period);
        self
    }

    pub fn wrap(&self) -> Option<f64> {
        self.wrap
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard all bodies and start a new tick.
    pub fn clear(&mut self, tick: u64) {
        self.tick = tick;
        self.entries.clear();
        self.inserts.clear();
        self.sorted.clear();
        self.finished = false;
        self.max_radius = 0.0;
    }

    /// Register a body in every cell its bounding box overlaps.
    pub fn add(&mut self, key: K, position: DVec2, radius: f64, government: Option<GovernmentId>) {
        if !position.is_finite() || !radius.is_finite() {
            return;
        }
        let radius = radius.max(0.0);
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            key,
            position,
            radius,
            government,
        });
        self.max_radius = self.max_radius.max(radius);
        self.finished = false;

        let (x0, y0) = self.cell_of(position - DVec2::splat(radius));
        let (x1, y1) = self.cell_of(position + DVec2::splat(radius));
        // A body wider than the table would otherwise land in a bucket twice.
        let span_x = ((x1 - x0 + 1) as usize).min(self.cells) as i64;
        let span_y = ((y1 - y0 + 1) as usize).min(self.cells) as i64;
        for gy in y0..y0 + span_y {
            for gx in x0..x0 + span_x {
                let bucket = self.bucket(gx, gy);
                self.inserts.push((bucket, index));
            }
        }
    }

    /// Bucket the insertions into a flat array. Repeated calls are no-ops.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.starts.iter_mut().for_each(|s| *s = 0);
        for &(bucket, _) in &self.inserts {
            self.starts[bucket as usize + 1] += 1;
        }
        for i in 1..self.starts.len() {
            self.starts[i] += self.starts[i - 1];
        }
        self.sorted.clear();
        self.sorted.resize(self.inserts.len(), 0);
        let mut cursor = self.starts.clone();
        for &(bucket, entry) in &self.inserts {
            let slot = &mut cursor[bucket as usize];
            self.sorted[*slot as usize] = entry;
            *slot += 1;
        }
        if self.seen.len() < self.entries.len() {
            self.seen.resize(self.entries.len(), 0);
        }
        self.finished = true;
    }

    /// Every body whose mask the segment `start → end` touches.
    pub fn line(&mut self, start: DVec2, end: DVec2, filter: &LineFilter<K>) -> Vec<Candidate<K>> {
        let mut out = Vec::new();
        if !self.finished || !start.is_finite() || !end.is_finite() {
            return out;
        }
        let stamp = self.next_stamp();
        let lo = start.min(end) - DVec2::splat(self.max_radius);
        let hi = start.max(end) + DVec2::splat(self.max_radius);
        for offset in self.tiles(lo, hi) {
            self.line_tile(start - offset, end - offset, filter, stamp, &mut out);
        }
        out
    }

    /// Bodies whose mask distance to `center` is at most `radius`.
    pub fn circle(&mut self, center: DVec2, radius: f64) -> Vec<K> {
        self.ring(center, 0.0, radius)
    }

    /// Bodies whose mask overlaps the annulus between `inner` and `outer`.
    pub fn ring(&mut self, center: DVec2, inner: f64, outer: f64) -> Vec<K> {
        let mut out = Vec::new();
        if !self.finished || !center.is_finite() || outer < inner.max(0.0) {
            return out;
        }
        let stamp = self.next_stamp();
        let reach = outer + self.max_radius;
        let lo = center - DVec2::splat(reach);
        let hi = center + DVec2::splat(reach);
        for offset in self.tiles(lo, hi) {
            let local = center - offset;
            let (x0, y0) = self.cell_of(local - DVec2::splat(reach));
            let (x1, y1) = self.cell_of(local + DVec2::splat(reach));
            let wide = (x1 - x0) as usize >= self.cells || (y1 - y0) as usize >= self.cells;
            if wide {
                for index in 0..self.entries.len() as u32 {
                    self.ring_test(index, local, inner, outer, stamp, &mut out);
                }
                continue;
            }
            for gy in y0..=y1 {
                for gx in x0..=x1 {
                    let bucket = self.bucket(gx, gy) as usize;
                    let (a, b) = (self.starts[bucket] as usize, self.starts[bucket + 1] as usize);
                    for slot in a..b {
                        let index = self.sorted[slot];
                        self.ring_test(index, local, inner, outer, stamp, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Every indexed body.
    pub fn all(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    /// Position and radius a body was indexed with.
    pub fn shape(&self, key: K) -> Option<(DVec2, f64)> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| (e.position, e.radius))
    }

    // ---- Internals ----

    fn cell_of(&self, p: DVec2) -> (i64, i64) {
        (
            (p.x / self.cell_size).floor() as i64,
            (p.y / self.cell_size).floor() as i64,
        )
    }

    fn bucket(&self, gx: i64, gy: i64) -> u32 {
        let mask = self.cells as i64 - 1;
        ((gy & mask) * self.cells as i64 + (gx & mask)) as u32
    }

    fn next_stamp(&mut self) -> u32 {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.seen.iter_mut().for_each(|s| *s = 0);
            self.stamp = 1;
        }
        self.stamp
    }

    /// Offsets of every wrap tile overlapping the box `lo..hi`.
    fn tiles(&self, lo: DVec2, hi: DVec2) -> Vec<DVec2> {
        let Some(period) = self.wrap else {
            return vec![DVec2::ZERO];
        };
        let (kx0, kx1) = ((lo.x / period).floor() as i64, (hi.x / period).floor() as i64);
        let (ky0, ky1) = ((lo.y / period).floor() as i64, (hi.y / period).floor() as i64);
        let mut tiles = Vec::with_capacity(((kx1 - kx0 + 1) * (ky1 - ky0 + 1)) as usize);
        for ky in ky0..=ky1 {
            for kx in kx0..=kx1 {
                tiles.push(DVec2::new(kx as f64 * period, ky as f64 * period));
            }
        }
        tiles
    }

    fn ring_test(&mut self, index: u32, center: DVec2, inner: f64, outer: f64, stamp: u32, out: &mut Vec<K>) {
        let seen = &mut self.seen[index as usize];
        if *seen == stamp {
            return;
        }
        let entry = &self.entries[index as usize];
        let d = entry.position.distance(center);
        if (d - entry.radius).max(0.0) <= outer && d + entry.radius >= inner {
            *seen = stamp;
            out.push(entry.key);
        }
    }

    /// Walk the cells a segment crosses with a 2D DDA.
    fn line_tile(
        &mut self,
        start: DVec2,
        end: DVec2,
        filter: &LineFilter<K>,
        stamp: u32,
        out: &mut Vec<Candidate<K>>,
    ) {
        // Short segments scan their padded bounding box; long ones walk a DDA
        // with a halo wide enough for the largest body.
        let pad = self.max_radius;
        let (bx0, by0) = self.cell_of(start.min(end) - DVec2::splat(pad));
        let (bx1, by1) = self.cell_of(start.max(end) + DVec2::splat(pad));
        let box_cells = (bx1 - bx0 + 1) * (by1 - by0 + 1);
        let halo = (pad / self.cell_size).ceil() as i64;

        let wide = (bx1 - bx0) as usize >= self.cells || (by1 - by0) as usize >= self.cells;
        if wide {
            for index in 0..self.entries.len() as u32 {
                self.line_test(index, start, end, filter, stamp, out);
            }
            return;
        }
        if box_cells <= 16 {
            for gy in by0..=by1 {
                for gx in bx0..=bx1 {
                    self.line_bucket(gx, gy, start, end, filter, stamp, out);
                }
            }
            return;
        }

        let delta = end - start;
        let (mut gx, mut gy) = self.cell_of(start);
        let (ex, ey) = self.cell_of(end);
        let step_x: i64 = if delta.x > 0.0 { 1 } else { -1 };
        let step_y: i64 = if delta.y > 0.0 { 1 } else { -1 };
        let cell = self.cell_size;
        let next_boundary = |g: i64, step: i64| {
            if step > 0 {
                (g + 1) as f64 * cell
            } else {
                g as f64 * cell
            }
        };
        let mut t_max_x = if delta.x != 0.0 {
            (next_boundary(gx, step_x) - start.x) / delta.x
        } else {
            f64::INFINITY
        };
        let mut t_max_y = if delta.y != 0.0 {
            (next_boundary(gy, step_y) - start.y) / delta.y
        } else {
            f64::INFINITY
        };
        let t_delta_x = if delta.x != 0.0 {
            self.cell_size / delta.x.abs()
        } else {
            f64::INFINITY
        };
        let t_delta_y = if delta.y != 0.0 {
            self.cell_size / delta.y.abs()
        } else {
            f64::INFINITY
        };

        let limit = (ex - gx).abs() + (ey - gy).abs() + 1;
        for _ in 0..=limit {
            for hy in gy - halo..=gy + halo {
                for hx in gx - halo..=gx + halo {
                    self.line_bucket(hx, hy, start, end, filter, stamp, out);
                }
            }
            if gx == ex && gy == ey {
                break;
            }
            if t_max_x < t_max_y {
                gx += step_x;
                t_max_x += t_delta_x;
            } else {
                gy += step_y;
                t_max_y += t_delta_y;
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn line_bucket(
        &mut self,
        gx: i64,
        gy: i64,
        start: DVec2,
        end: DVec2,
        filter: &LineFilter<K>,
        stamp: u32,
        out: &mut Vec<Candidate<K>>,
    ) {
        let bucket = self.bucket(gx, gy) as usize;
        let (a, b) = (self.starts[bucket] as usize, self.starts[bucket + 1] as usize);
        for slot in a..b {
            let index = self.sorted[slot];
            self.line_test(index, start, end, filter, stamp, out);
        }
    }

    fn line_test(
        &mut self,
        index: u32,
        start: DVec2,
        end: DVec2,
        filter: &LineFilter<K>,
        stamp: u32,
        out: &mut Vec<Candidate<K>>,
    ) {
        if self.seen[index as usize] == stamp {
            return;
        }
        let entry = self.entries[index as usize];
        if filter.only.is_some_and(|k| k != entry.key)
            || filter.exclude.is_some_and(|k| k == entry.key)
            || (filter.exclude_government.is_some() && filter.exclude_government == entry.government)
        {
            return;
        }
        if let Some(fraction) = segment_circle(start, end, entry.position, entry.radius) {
            self.seen[index as usize] = stamp;
            out.push(Candidate {
                key: entry.key,
                fraction,
            });
        }
    }
}

/// Fraction along `start → end` where the segment first touches the circle.
pub fn segment_circle(start: DVec2, end: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    let f = start - center;
    let c = f.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }
    let d = end - start;
    let a = d.length_squared();
    if a == 0.0 {
        return None;
    }
    let b = 2.0 * f.dot(d);
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    (0.0..=1.0).contains(&t).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(bodies: &[(u32, DVec2, f64)]) -> SpatialIndex<u32> {
        let mut index = SpatialIndex::new(64.0, 16);
        index.clear(1);
        for &(key, p, r) in bodies {
            index.add(key, p, r, None);
        }
        index.finish();
        index
    }

    fn sorted(mut keys: Vec<u32>) -> Vec<u32> {
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_circle_matches_brute_force() {
        let bodies: Vec<(u32, DVec2, f64)> = (0..200)
            .map(|i| {
                let x = ((i * 37) % 101) as f64 * 9.0 - 450.0;
                let y = ((i * 53) % 97) as f64 * 11.0 - 500.0;
                (i, DVec2::new(x, y), (i % 7) as f64 * 3.0)
            })
            .collect();
        let mut index = index_with(&bodies);
        for (center, r) in [
            (DVec2::ZERO, 100.0),
            (DVec2::new(300.0, -200.0), 55.0),
            (DVec2::new(-1000.0, 0.0), 5.0),
            (DVec2::new(10.0, 10.0), 5000.0),
        ] {
            let expected: Vec<u32> = bodies
                .iter()
                .filter(|(_, p, br)| (p.distance(center) - br).max(0.0) <= r)
                .map(|(k, _, _)| *k)
                .collect();
            assert_eq!(sorted(index.circle(center, r)), sorted(expected));
        }
    }

    #[test]
    fn test_cleared_index_is_empty_until_finished() {
        let mut index = index_with(&[(1, DVec2::ZERO, 10.0)]);
        index.clear(2);
        assert!(index.circle(DVec2::ZERO, 100.0).is_empty());

        index.add(1, DVec2::ZERO, 10.0, None);
        assert!(index.circle(DVec2::ZERO, 100.0).is_empty());
        index.finish();
        assert_eq!(index.circle(DVec2::ZERO, 100.0), vec![1]);
        assert_eq!(index.tick(), 2);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut index = index_with(&[
            (1, DVec2::new(0.0, 0.0), 5.0),
            (2, DVec2::new(70.0, 0.0), 5.0),
            (3, DVec2::new(200.0, 30.0), 40.0),
        ]);
        let circle_once = sorted(index.circle(DVec2::new(50.0, 0.0), 60.0));
        let line_once = index.line(DVec2::new(-20.0, 0.0), DVec2::new(300.0, 0.0), &LineFilter::default());
        index.finish();
        assert_eq!(sorted(index.circle(DVec2::new(50.0, 0.0), 60.0)), circle_once);
        assert_eq!(
            index.line(DVec2::new(-20.0, 0.0), DVec2::new(300.0, 0.0), &LineFilter::default()),
            line_once
        );
    }

    #[test]
    fn test_line_reports_entry_fraction() {
        let mut index = index_with(&[(1, DVec2::new(50.0, 0.0), 10.0), (2, DVec2::new(50.0, 40.0), 10.0)]);
        let hits = index.line(DVec2::ZERO, DVec2::new(100.0, 0.0), &LineFilter::default());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, 1);
        assert!((hits[0].fraction - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_long_line_crosses_many_cells() {
        let bodies: Vec<(u32, DVec2, f64)> =
            (0..20).map(|i| (i, DVec2::new(i as f64 * 100.0, 3.0), 4.0)).collect();
        let mut index = index_with(&bodies);
        let hits = index.line(DVec2::new(-10.0, 0.0), DVec2::new(950.0, 1.0), &LineFilter::default());
        let keys = sorted(hits.iter().map(|c| c.key).collect());
        assert_eq!(keys, (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_line_filters() {
        let mut index = SpatialIndex::new(64.0, 16);
        index.clear(0);
        index.add(1, DVec2::new(20.0, 0.0), 5.0, Some(GovernmentId(1)));
        index.add(2, DVec2::new(40.0, 0.0), 5.0, Some(GovernmentId(2)));
        index.add(3, DVec2::new(60.0, 0.0), 5.0, Some(GovernmentId(2)));
        index.finish();
        let (a, b) = (DVec2::ZERO, DVec2::new(100.0, 0.0));

        let only = LineFilter {
            only: Some(3),
            ..Default::default()
        };
        assert_eq!(index.line(a, b, &only).iter().map(|c| c.key).collect::<Vec<_>>(), vec![3]);

        let exclude = LineFilter {
            exclude: Some(1),
            ..Default::default()
        };
        assert_eq!(sorted(index.line(a, b, &exclude).iter().map(|c| c.key).collect()), vec![2, 3]);

        let no_gov = LineFilter {
            exclude_government: Some(GovernmentId(2)),
            ..Default::default()
        };
        assert_eq!(index.line(a, b, &no_gov).iter().map(|c| c.key).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_ring_selects_annulus() {
        let mut index = index_with(&[
            (1, DVec2::new(10.0, 0.0), 1.0),
            (2, DVec2::new(100.0, 0.0), 1.0),
            (3, DVec2::new(0.0, 195.0), 10.0),
            (4, DVec2::new(0.0, 400.0), 1.0),
        ]);
        assert_eq!(sorted(index.ring(DVec2::ZERO, 50.0, 190.0)), vec![2, 3]);
        assert_eq!(index.all().count(), 4);
    }

    #[test]
    fn test_wrapped_query_finds_body_across_seam() {
        let mut index = SpatialIndex::new(128.0, 32).with_wrap(4096.0);
        index.clear(0);
        index.add(7, DVec2::new(5.0, 2000.0), 8.0, None);
        index.finish();
        let hits = index.line(
            DVec2::new(4080.0, 2000.0),
            DVec2::new(4110.0, 2000.0),
            &LineFilter::default(),
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, 7);
        assert_eq!(index.circle(DVec2::new(4090.0, 2000.0), 5.0), vec![7]);
    }

    #[test]
    fn test_segment_circle_start_inside() {
        assert_eq!(segment_circle(DVec2::ZERO, DVec2::X, DVec2::ZERO, 1.0), Some(0.0));
        assert_eq!(segment_circle(DVec2::ZERO, DVec2::ZERO, DVec2::new(5.0, 0.0), 1.0), None);
    }
}
