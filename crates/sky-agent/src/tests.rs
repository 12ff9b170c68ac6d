//! Unit tests for sky-agent.

#[cfg(test)]
mod helpers {
    use sky_core::{AgentId, Coordinate3D, Coordinate4D};
    use crate::{PathAgent, PathAgentBuilder, PathSegment};

    pub fn c(x: i64, y: i64, z: i64, t: i64) -> Coordinate4D {
        Coordinate4D::new(x, y, z, t)
    }

    /// Twelve cells from (2,3,4,5) to (5,6,7,16) with waits at t=8 and t=16.
    pub fn zigzag() -> PathSegment {
        let coords = vec![
            c(2, 3, 4, 5),
            c(2, 3, 5, 6),
            c(2, 3, 6, 7),
            c(2, 3, 6, 8),
            c(2, 4, 6, 9),
            c(2, 5, 6, 10),
            c(2, 6, 6, 11),
            c(3, 6, 6, 12),
            c(4, 6, 6, 13),
            c(5, 6, 6, 14),
            c(5, 6, 7, 15),
            c(5, 6, 7, 16),
        ];
        PathSegment::new(Coordinate3D::new(2, 3, 4), Coordinate3D::new(5, 6, 7), 0, coords)
    }

    /// Two legs: (0,0,0) → (3,0,0) by t=4, dwell 2, → (3,0,3) by t=10.
    pub fn courier() -> PathAgent {
        PathAgentBuilder::new(AgentId(1))
            .stops([c(0, 0, 0, 1), c(3, 0, 0, 4), c(3, 0, 3, 10)])
            .stays(vec![2])
            .battery(100)
            .priority(0.5)
            .build()
            .unwrap()
    }

    pub fn leg0() -> PathSegment {
        PathSegment::new(
            Coordinate3D::new(0, 0, 0),
            Coordinate3D::new(3, 0, 0),
            0,
            vec![c(0, 0, 0, 1), c(1, 0, 0, 2), c(2, 0, 0, 3), c(3, 0, 0, 4)],
        )
    }

    pub fn leg1() -> PathSegment {
        PathSegment::new(
            Coordinate3D::new(3, 0, 0),
            Coordinate3D::new(3, 0, 3),
            1,
            vec![c(3, 0, 0, 7), c(3, 0, 1, 8), c(3, 0, 2, 9), c(3, 0, 3, 10)],
        )
    }
}

// ── Segments ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod segments {
    use super::helpers::*;
    use crate::{Segment, SpaceSegment};

    #[test]
    fn path_bounds() {
        let s = zigzag();
        assert_eq!(s.voxels(), 12);
        assert_eq!(s.min(), c(2, 3, 4, 5));
        assert_eq!(s.max(), c(5, 6, 7, 16));
    }

    #[test]
    fn path_split() {
        let s = zigzag();
        let (first, second) = s.split_temporal(8);
        assert_eq!(first.max(), c(2, 3, 6, 8));
        assert_eq!(second.min(), c(2, 4, 6, 9));
        assert_eq!(first.index, s.index);
        assert_eq!(second.end, s.end);
    }

    #[test]
    fn path_split_concatenates_back() {
        let s = zigzag();
        for t in s.min().t..s.max().t {
            let (first, second) = s.split_temporal(t);
            let mut joined = first.coordinates.clone();
            joined.extend(second.coordinates.iter().copied());
            assert_eq!(joined, s.coordinates, "split at {t}");
        }
    }

    #[test]
    fn join_skips_repeated_cell() {
        let s = zigzag();
        let (mut first, second) = s.split_temporal(10);
        let mut overlapping = second.clone();
        overlapping.coordinates.insert(0, first.max());
        first.join(overlapping);
        assert_eq!(first.coordinates, s.coordinates);
    }

    #[test]
    fn position_lookup() {
        let s = zigzag();
        assert_eq!(s.position_at(12), Some(c(3, 6, 6, 12)));
        assert_eq!(s.position_at(4), None);
        assert_eq!(s.position_at(17), None);
        assert_eq!(s.positions_between(7, 9).count(), 3);
    }

    #[test]
    fn space_split_keeps_voxels() {
        let s = SpaceSegment::new(c(0, 0, 0, 0), c(1, 1, 1, 40), 0);
        let (first, second) = s.split_temporal(30);
        assert_eq!(first.max.t, 30);
        assert_eq!(second.min.t, 31);
        assert_eq!(s.voxels(), 2 * 2 * 2 * 41);
        assert_eq!(first.voxels() + second.voxels(), s.voxels());
    }

    #[test]
    fn segment_enum_dispatch() {
        let p = Segment::from(zigzag());
        let s = Segment::from(SpaceSegment::new(c(0, 0, 0, 0), c(0, 0, 0, 9), 3));
        assert_eq!(p.voxels(), 12);
        assert_eq!(s.voxels(), 10);
        assert_eq!(s.index(), 3);
        assert_eq!(p.kind(), "path");
    }
}

// ── Path agents ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod path_agent {
    use sky_core::{AgentId, Tick};
    use super::helpers::*;
    use crate::{BidDemand, PathAgentBuilder, PathBid};

    fn path_bid(agent: &crate::PathAgent, tick: u64) -> Option<PathBid> {
        agent.bid(Tick(tick)).map(|b| match b.demand {
            BidDemand::Path(p) => p,
            BidDemand::Space(_) => panic!("path agent produced a space bid"),
        })
    }

    #[test]
    fn builder_validates() {
        assert!(PathAgentBuilder::new(AgentId(0)).stop(c(0, 0, 0, 0)).build().is_err());
        assert!(
            PathAgentBuilder::new(AgentId(0))
                .stops([c(0, 0, 0, 0), c(1, 0, 0, 0)])
                .speed(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn joins_same_leg() {
        let mut a = courier();
        let (first, second) = leg0().split_temporal(2);
        a.add_allocated_segment(first);
        a.add_allocated_segment(second);
        a.add_allocated_segment(leg1());
        assert_eq!(a.allocated_segments.len(), 2);
        assert_eq!(a.allocated_segments[0], leg0());
        assert_eq!(a.airtime(), 6);
        assert_eq!(a.allocated_coords().len(), 8);
    }

    #[test]
    fn fresh_bid_is_full_itinerary() {
        let a = courier();
        let bid = path_bid(&a, 0).unwrap();
        assert_eq!(bid.start, c(0, 0, 0, 1));
        assert_eq!(bid.targets.len(), 2);
        assert_eq!(bid.start_leg, 0);
        assert!(!bid.flying);
        assert_eq!(bid.battery, 100);
    }

    #[test]
    fn flying_bid_starts_at_current_cell() {
        let mut a = courier();
        a.add_allocated_segment(leg0());
        let bid = path_bid(&a, 2).unwrap();
        assert!(bid.flying);
        assert_eq!(bid.start, c(1, 0, 0, 2));
        assert_eq!(bid.targets, vec![c(3, 0, 0, 4), c(3, 0, 3, 10)]);
        assert_eq!(bid.stays, vec![2]);
        assert_eq!(bid.battery, 99);
    }

    #[test]
    fn grounded_bid_waits_out_the_stay() {
        let mut a = courier();
        a.add_allocated_segment(leg0());
        let bid = path_bid(&a, 6).unwrap();
        assert!(!bid.flying);
        assert_eq!(bid.start, c(3, 0, 0, 7));
        assert_eq!(bid.targets, vec![c(3, 0, 3, 10)]);
        assert!(bid.stays.is_empty());
        assert_eq!(bid.start_leg, 1);
        assert_eq!(bid.battery, 97);
    }

    #[test]
    fn first_stay_is_spent_at_the_second_stop() {
        let mut a = PathAgentBuilder::new(AgentId(4))
            .stops([c(0, 0, 0, 1), c(3, 0, 0, 4), c(3, 0, 3, 20), c(0, 0, 3, 40)])
            .stays(vec![5, 9])
            .battery(100)
            .build()
            .unwrap();
        a.add_allocated_segment(leg0());

        let bid = path_bid(&a, 5).unwrap();
        assert!(!bid.flying);
        assert_eq!(bid.start, c(3, 0, 0, 10));
        assert_eq!(bid.start_leg, 1);
        assert_eq!(bid.targets, vec![c(3, 0, 3, 20), c(0, 0, 3, 40)]);
        assert_eq!(bid.stays, vec![9]);
    }

    #[test]
    fn truncated_leg_keeps_flying() {
        let mut a = courier();
        let (kept, _) = leg0().split_temporal(2);
        a.add_allocated_segment(kept);
        let bid = path_bid(&a, 3).unwrap();
        assert!(bid.flying);
        assert_eq!(bid.start, c(1, 0, 0, 3));
        assert_eq!(bid.start_leg, 0);
    }

    #[test]
    fn finished_agent_has_no_bid() {
        let mut a = courier();
        a.add_allocated_segment(leg0());
        a.add_allocated_segment(leg1());
        assert!(a.bid(Tick(20)).is_none());
    }

    #[test]
    fn value_on_time_late_and_crashed() {
        let a = courier();
        assert_eq!(a.value_for_segments(&[leg0(), leg1()]), 1.0);
        assert_eq!(a.value_for_segments(&[leg0()]), -1.0);
        assert_eq!(a.value_for_segments(&[]), 0.0);

        let mut late = leg1();
        for (i, cell) in late.coordinates.iter_mut().enumerate() {
            cell.t = 12 + i as i64;
        }
        assert_eq!(a.value_for_segments(&[leg0(), late]), 0.95);

        let mut tired = courier();
        tired.battery = 5;
        assert_eq!(tired.value_for_segments(&[leg0(), leg1()]), -1.0);
    }
}

// ── Space agents & dispatch ───────────────────────────────────────────────────

#[cfg(test)]
mod space_agent {
    use sky_core::{AgentId, Tick};
    use super::helpers::*;
    use crate::{Agent, AgentError, Segment, SpaceAgent, SpaceSegment};

    fn plot() -> SpaceAgent {
        SpaceAgent::new(
            AgentId(9),
            vec![(c(0, 0, 0, 5), c(1, 1, 1, 9)), (c(4, 0, 4, 20), c(5, 1, 5, 24))],
            0.3,
        )
    }

    #[test]
    fn bid_drops_past_blocks() {
        let a = plot();
        assert_eq!(a.bid(Tick(0)).map(|b| b.priority), Some(0.3));
        let Some(bid) = a.bid(Tick(10)) else { panic!("expected a bid") };
        match bid.demand {
            crate::BidDemand::Space(s) => assert_eq!(s.blocks.len(), 1),
            crate::BidDemand::Path(_) => panic!("space agent produced a path bid"),
        }
        assert!(a.bid(Tick(30)).is_none());
    }

    #[test]
    fn value_is_voxel_share() {
        let a = plot();
        let half = SpaceSegment::new(c(0, 0, 0, 5), c(1, 1, 1, 9), 0);
        assert_eq!(a.value_for_segments(&[half]), 0.5);
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        let mut agent = Agent::from(plot());
        let err = agent.add_allocated_segment(Segment::from(leg0())).unwrap_err();
        assert!(matches!(err, AgentError::KindMismatch { agent_kind: "space", .. }));
        assert!(agent.value_for_segments(&[Segment::from(leg0())]).is_err());
    }

    #[test]
    fn speculative_clone_keeps_origin() {
        let agent = Agent::from(courier());
        let clone = agent.speculative_clone();
        assert!(clone.is_clone());
        assert!(!agent.is_clone());
        assert_eq!(clone.identity(), agent.identity());
        assert_eq!(clone.id(), AgentId(1));
        assert_eq!(clone.near_radius(), 1);
        assert_eq!(Agent::from(plot()).near_radius(), 0);
    }
}
