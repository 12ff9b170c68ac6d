//! Unit tests for sky-mechanism.

#[cfg(test)]
mod helpers {
    use sky_agent::{Agent, PathAgent, PathAgentBuilder, PathSegment, SpaceAgent};
    use sky_core::{AgentId, BlockerSpec, Coordinate3D, Coordinate4D, WorldConfig};
    use sky_env::Environment;

    pub fn c(x: i64, y: i64, z: i64, t: i64) -> Coordinate4D {
        Coordinate4D::new(x, y, z, t)
    }

    pub fn world(dimension: Coordinate4D, boxes: &[(Coordinate3D, Coordinate3D)]) -> Environment {
        let mut config = WorldConfig::new(dimension);
        for &(location, dimension) in boxes {
            config = config.with_blocker(BlockerSpec::StaticBox { location, dimension });
        }
        Environment::from_config(&config).unwrap()
    }

    /// 10×1×10×100, no blockers.
    pub fn open_sky() -> Environment {
        world(c(10, 1, 10, 100), &[])
    }

    /// A one-cell-wide corridor along x: 10×1×1×100.
    pub fn corridor() -> Environment {
        world(c(10, 1, 1, 100), &[])
    }

    pub fn flight(id: u32, from: Coordinate4D, to: Coordinate4D, priority: f64) -> PathAgent {
        PathAgentBuilder::new(AgentId(id)).stops([from, to]).priority(priority).build().unwrap()
    }

    pub fn plot(id: u32, min: Coordinate4D, max: Coordinate4D, priority: f64) -> Agent {
        Agent::Space(SpaceAgent::new(AgentId(id), vec![(min, max)], priority))
    }

    /// Registers `agent` and parks it at `cell` for every tick in `ticks`.
    pub fn park(env: &mut Environment, agent: PathAgent, cell: Coordinate4D, ticks: std::ops::RangeInclusive<i64>) {
        let id = agent.id();
        env.add_agent(Agent::Path(agent)).unwrap();
        let coords: Vec<_> = ticks.map(|t| cell.with_t(t)).collect();
        env.allocate_path_segment(id, PathSegment::new(cell.to_3d(), cell.to_3d(), 0, coords)).unwrap();
    }
}

// ── BidTracker ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod bid_tracker {
    use sky_agent::Agent;
    use sky_core::{AgentId, Tick};
    use super::helpers::*;
    use crate::BidTracker;

    #[test]
    fn last_bid_is_memoized() {
        let agent = Agent::Path(flight(1, c(0, 0, 0, 0), c(5, 0, 0, 10), 0.4));
        let mut tracker = BidTracker::new();

        let first = tracker.last_bid(Tick(2), &agent);
        let second = tracker.last_bid(Tick(2), &agent);
        assert_eq!(first, second);
        assert_eq!(tracker.bids_for(Tick(2), AgentId(1)).len(), 1);

        tracker.request_new_bid(Tick(2), &agent);
        assert_eq!(tracker.bids_for(Tick(2), AgentId(1)).len(), 2);
        assert!(tracker.bids_for(Tick(3), AgentId(1)).is_empty());
    }

    #[test]
    fn keeps_the_highest_priority_seen() {
        let mut tracker = BidTracker::new();
        let mut agent = flight(1, c(0, 0, 0, 0), c(5, 0, 0, 10), 0.3);
        tracker.request_new_bid(Tick(0), &Agent::Path(agent.clone()));
        agent.priority = 0.7;
        tracker.request_new_bid(Tick(1), &Agent::Path(agent.clone()));
        agent.priority = 0.2;
        tracker.request_new_bid(Tick(2), &Agent::Path(agent));
        assert_eq!(tracker.max_priority(AgentId(1)), Some(0.7));
        assert_eq!(tracker.max_priority(AgentId(2)), None);
    }

    #[test]
    fn exhausted_agents_have_no_priority() {
        let expired = plot(4, c(0, 0, 0, 0), c(1, 0, 1, 3), 0.5);
        let mut tracker = BidTracker::new();
        assert!(tracker.last_bid(Tick(10), &expired).is_none());
        assert_eq!(tracker.priority(Tick(10), &expired), f64::NEG_INFINITY);
        assert_eq!(tracker.max_priority(AgentId(4)), None);
    }

    #[test]
    fn pruning_keeps_max_priority() {
        let agent = Agent::Path(flight(1, c(0, 0, 0, 0), c(5, 0, 0, 10), 0.6));
        let mut tracker = BidTracker::new();
        tracker.last_bid(Tick(1), &agent);
        tracker.last_bid(Tick(5), &agent);
        tracker.prune_before(Tick(5));
        assert!(tracker.bids_for(Tick(1), AgentId(1)).is_empty());
        assert_eq!(tracker.bids_for(Tick(5), AgentId(1)).len(), 1);
        assert_eq!(tracker.max_priority(AgentId(1)), Some(0.6));
    }
}

// ── DisplacementPolicy ────────────────────────────────────────────────────────

#[cfg(test)]
mod policy {
    use sky_agent::{Bid, BidDemand, SpaceBid};
    use sky_core::AgentId;
    use crate::DisplacementPolicy;

    fn bid(priority: f64) -> Bid {
        Bid { agent: AgentId(0), priority, demand: BidDemand::Space(SpaceBid { blocks: vec![] }) }
    }

    #[test]
    fn preemption_needs_strictly_higher_priority() {
        let levels = [0.0, 0.1, 0.5, 0.5, 0.9, 1.0];
        for &p1 in &levels {
            for &p2 in &levels {
                let allowed = DisplacementPolicy::Preemptive.may_displace(&bid(p1), &bid(p2));
                assert_eq!(allowed, p1 > p2, "{p1} vs {p2}");
                assert!(!DisplacementPolicy::NonPreemptive.may_displace(&bid(p1), &bid(p2)));
            }
        }
    }
}

// ── A* ────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod astar {
    use sky_core::{AStarConfig, AgentId, Coordinate3D, Tick};
    use super::helpers::*;
    use crate::{AStar, BidTracker, DisplacementPolicy, MechanismError};

    fn exact() -> AStarConfig {
        AStarConfig { max_iter: 100_000, step_cost: 1.0, height_adjust: 0.0 }
    }

    #[test]
    fn detours_around_two_boxes() {
        let env = world(
            c(20, 1, 20, 1000),
            &[
                (Coordinate3D::new(3, 0, 3), Coordinate3D::new(4, 1, 5)),
                (Coordinate3D::new(9, 0, 6), Coordinate3D::new(2, 1, 8)),
            ],
        );
        let agent = flight(1, c(0, 0, 5, 2), c(17, 0, 8, 25), 0.5);
        let bid = agent.bid(Tick(1)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(1), exact(), DisplacementPolicy::Preemptive);

        let result = astar.search(c(0, 0, 5, 2), c(17, 0, 8, 25), &agent, &bid).unwrap().unwrap();
        assert_eq!(result.path.len(), 29);
        assert_eq!(result.path[0], c(0, 0, 5, 2));
        assert_eq!(*result.path.last().unwrap(), c(17, 0, 8, 30));
        assert!(result.collisions.is_empty());
        for cell in &result.path {
            assert!(!env.is_blocked(*cell, &agent), "{cell} is blocked");
        }
    }

    #[test]
    fn open_sky_path_is_manhattan() {
        let env = open_sky();
        let agent = flight(1, c(1, 0, 1, 1), c(6, 0, 4, 20), 0.5);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::Preemptive);

        let result = astar.search(c(1, 0, 1, 1), c(6, 0, 4, 20), &agent, &bid).unwrap().unwrap();
        assert_eq!(result.path.len(), 9);
        for pair in result.path.windows(2) {
            assert_eq!(pair[1].t, pair[0].t + 1);
            assert!(pair[0].distance_l1(pair[1]) <= 1);
        }
    }

    #[test]
    fn slow_agents_get_explicit_waits() {
        let env = open_sky();
        let mut agent = flight(1, c(1, 0, 1, 1), c(6, 0, 4, 20), 0.5);
        agent.speed = 2;
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::Preemptive);

        let result = astar.search(c(1, 0, 1, 1), c(6, 0, 4, 20), &agent, &bid).unwrap().unwrap();
        assert_eq!(result.path.len(), 18);
        assert_eq!(*result.path.last().unwrap(), c(6, 0, 4, 18));
        assert!(result.path.windows(2).all(|p| p[1].t == p[0].t + 1));
    }

    #[test]
    fn goal_beyond_horizon_is_unreachable() {
        let env = open_sky();
        let agent = flight(1, c(0, 0, 0, 95), c(9, 0, 0, 99), 0.5);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::Preemptive);
        assert!(astar.search(c(0, 0, 0, 95), c(9, 0, 0, 99), &agent, &bid).unwrap().is_none());
    }

    #[test]
    fn iteration_cap_ends_the_search() {
        let env = open_sky();
        let agent = flight(1, c(0, 0, 0, 1), c(9, 0, 9, 50), 0.5);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let config = AStarConfig { max_iter: 3, ..exact() };
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), config, DisplacementPolicy::Preemptive);
        assert!(astar.search(c(0, 0, 0, 1), c(9, 0, 9, 50), &agent, &bid).unwrap().is_none());
    }

    #[test]
    fn past_positions_are_an_invariant_violation() {
        let env = open_sky();
        let agent = flight(1, c(0, 0, 0, 1), c(3, 0, 0, 5), 0.5);
        let bid = agent.bid(Tick(4)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(4), exact(), DisplacementPolicy::Preemptive);
        let err = astar.validate(c(0, 0, 0, 3), &agent, &bid).unwrap_err();
        assert!(matches!(err, MechanismError::PastTick { .. }));
    }

    #[test]
    fn current_tick_is_only_valid_for_a_flying_start() {
        let env = open_sky();
        let agent = flight(1, c(0, 0, 0, 1), c(3, 0, 0, 5), 0.5);
        let bid = agent.bid(Tick(4)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(4), exact(), DisplacementPolicy::Preemptive);
        assert!(astar.validate(c(0, 0, 0, 4), &agent, &bid).unwrap().is_none());
        assert_eq!(astar.validate(c(0, 0, 0, 5), &agent, &bid).unwrap(), Some(vec![]));
    }

    #[test]
    fn lower_priority_occupants_are_collected() {
        let mut env = corridor();
        park(&mut env, flight(2, c(5, 0, 0, 0), c(5, 0, 0, 100), 0.1), c(5, 0, 0, 0), 0..=100);
        let agent = flight(1, c(0, 0, 0, 1), c(9, 0, 0, 30), 0.5);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::Preemptive);

        let result = astar.search(c(0, 0, 0, 1), c(9, 0, 0, 30), &agent, &bid).unwrap().unwrap();
        assert_eq!(result.collisions, vec![AgentId(2)]);
        assert_eq!(result.path.len(), 10);
    }

    #[test]
    fn equal_priority_occupants_block() {
        let mut env = corridor();
        park(&mut env, flight(2, c(5, 0, 0, 0), c(5, 0, 0, 100), 0.5), c(5, 0, 0, 0), 0..=100);
        let agent = flight(1, c(0, 0, 0, 1), c(9, 0, 0, 30), 0.5);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::Preemptive);
        assert!(astar.search(c(0, 0, 0, 1), c(9, 0, 0, 30), &agent, &bid).unwrap().is_none());
    }

    #[test]
    fn non_preemptive_search_never_displaces() {
        let mut env = corridor();
        park(&mut env, flight(2, c(5, 0, 0, 0), c(5, 0, 0, 100), 0.1), c(5, 0, 0, 0), 0..=100);
        let agent = flight(1, c(0, 0, 0, 1), c(9, 0, 0, 30), 0.9);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::NonPreemptive);
        assert!(astar.search(c(0, 0, 0, 1), c(9, 0, 0, 30), &agent, &bid).unwrap().is_none());
    }

    #[test]
    fn occupant_without_bid_is_an_invariant_violation() {
        let mut env = corridor();
        let mut stuck = flight(2, c(5, 0, 0, 0), c(5, 0, 0, 100), 0.1);
        stuck.locations.truncate(1);
        park(&mut env, stuck, c(5, 0, 0, 0), 0..=100);
        let agent = flight(1, c(0, 0, 0, 1), c(9, 0, 0, 30), 0.9);
        let bid = agent.bid(Tick(0)).unwrap();
        let mut tracker = BidTracker::new();
        let mut astar = AStar::new(&env, &mut tracker, Tick(0), exact(), DisplacementPolicy::Preemptive);
        assert!(astar.validate(c(2, 0, 0, 3), &agent, &bid).unwrap().is_some());
        let err = astar.validate(c(4, 0, 0, 3), &agent, &bid).unwrap_err();
        assert!(matches!(err, MechanismError::StuckAgent(AgentId(2))));
    }
}

// ── Allocators ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod allocators {
    use sky_agent::{Agent, AllocationReason, PathAgentBuilder, Segment};
    use sky_core::{AStarConfig, AgentId, Coordinate3D, Tick};
    use super::helpers::*;
    use crate::{Allocator, BidTracker, Mechanism, PriorityAllocator};

    fn segments_of(env: &sky_env::Environment, id: u32) -> Vec<Segment> {
        env.agent(AgentId(id)).unwrap().allocated_segments()
    }

    #[test]
    fn single_flight_is_granted_from_the_next_tick() {
        let mut env = corridor();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        let out = mechanism
            .allocate(vec![Agent::Path(flight(1, c(0, 0, 0, 0), c(9, 0, 0, 9), 0.1))], &mut env, Tick(0))
            .unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].history.reason, AllocationReason::FirstAllocation);
        assert!(!out[0].agent.is_clone);
        let segments = segments_of(&env, 1);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].min(), c(0, 0, 0, 1));
        assert_eq!(segments[0].max(), c(9, 0, 0, 10));
        assert_eq!(segments[0].voxels(), 10);
    }

    #[test]
    fn legs_are_separated_by_the_dwell() {
        let mut env = open_sky();
        let courier = PathAgentBuilder::new(AgentId(1))
            .stops([c(0, 0, 0, 0), c(3, 0, 0, 0), c(3, 0, 3, 0)])
            .stays(vec![2])
            .priority(0.5)
            .build()
            .unwrap();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        mechanism.allocate(vec![Agent::Path(courier)], &mut env, Tick(0)).unwrap();

        let segments = segments_of(&env, 1);
        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].index(), segments[0].min().t, segments[0].max().t), (0, 1, 4));
        assert_eq!((segments[1].index(), segments[1].min().t, segments[1].max().t), (1, 7, 10));
        assert_eq!(segments[1].max(), c(3, 0, 3, 10));
    }

    #[test]
    fn higher_priority_displaces_and_the_loser_is_replanned() {
        let mut env = corridor();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        mechanism
            .allocate(vec![Agent::Path(flight(1, c(0, 0, 0, 0), c(9, 0, 0, 9), 0.1))], &mut env, Tick(0))
            .unwrap();

        let out = mechanism
            .allocate(vec![Agent::Path(flight(2, c(9, 0, 0, 0), c(0, 0, 0, 20), 0.9))], &mut env, Tick(1))
            .unwrap();

        let winner = out.iter().find(|a| a.agent_id() == AgentId(2)).unwrap();
        assert_eq!(winner.history.reason, AllocationReason::FirstAllocation);
        assert_eq!(winner.history.displaced, vec![AgentId(1)]);
        let loser = out.iter().find(|a| a.agent_id() == AgentId(1)).unwrap();
        assert!(loser.is_failure());
        assert_eq!(out.len(), 2);

        assert!(segments_of(&env, 1).is_empty());
        assert_eq!(segments_of(&env, 2)[0].max(), c(0, 0, 0, 11));
    }

    #[test]
    fn fcfs_never_displaces() {
        let mut env = corridor();
        let mut mechanism = Mechanism::fcfs(AStarConfig::default(), 1.0);
        mechanism
            .allocate(vec![Agent::Path(flight(1, c(0, 0, 0, 0), c(9, 0, 0, 9), 0.1))], &mut env, Tick(0))
            .unwrap();

        let out = mechanism
            .allocate(vec![Agent::Path(flight(2, c(9, 0, 0, 0), c(0, 0, 0, 20), 0.9))], &mut env, Tick(1))
            .unwrap();

        assert_eq!(out.len(), 1);
        assert!(out[0].is_failure());
        assert_eq!(env.agent_count(), 2);
        assert_eq!(segments_of(&env, 1)[0].max(), c(9, 0, 0, 10));
        assert!(segments_of(&env, 2).is_empty());
    }

    #[test]
    fn fcfs_serves_in_arrival_order() {
        let mut env = corridor();
        let mut mechanism = Mechanism::fcfs(AStarConfig::default(), 1.0);
        let out = mechanism
            .allocate(
                vec![
                    Agent::Path(flight(7, c(0, 0, 0, 0), c(9, 0, 0, 9), 0.1)),
                    Agent::Path(flight(3, c(9, 0, 0, 0), c(0, 0, 0, 9), 0.9)),
                ],
                &mut env,
                Tick(0),
            )
            .unwrap();
        assert_eq!(out[0].agent_id(), AgentId(7));
        assert!(!out[0].is_failure());
        assert!(out[1].is_failure());
    }

    #[test]
    fn known_agents_are_replanned_mid_flight() {
        let mut env = corridor();
        let mut tracker = BidTracker::new();
        let mut allocator = PriorityAllocator::default();
        let agent = Agent::Path(flight(1, c(0, 0, 0, 0), c(9, 0, 0, 9), 0.1));
        allocator.allocate(&[agent.clone()], &mut env, Tick(0), &mut tracker).unwrap();

        let out = allocator.allocate(&[agent], &mut env, Tick(3), &mut tracker).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].history.reason, AllocationReason::Reallocation);
        assert!(out[0].history.bid.as_ref().unwrap().is_flying());

        let segments = segments_of(&env, 1);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].voxels(), 11);
        assert_eq!(segments[0].min(), c(0, 0, 0, 1));
        assert_eq!(segments[0].max(), c(9, 0, 0, 11));
    }

    /// Three crossing flights with radius 0.  Agent 3 cuts through agent 2's
    /// column, which in turn must cut through agent 1's row to replan; both
    /// losers are airborne when it happens.
    #[test]
    fn displacement_cascades_through_agents_in_flight() {
        let exact = AStarConfig { max_iter: 100_000, step_cost: 1.0, height_adjust: 0.0 };
        let tight = |id, from, to, priority| {
            let mut a = flight(id, from, to, priority);
            a.near_radius = 0;
            Agent::Path(a)
        };
        let mut env = open_sky();
        let mut mechanism = Mechanism::priority(exact, 1.0);

        // Row z=5 from t=1, then pushed back one tick by agent 2's column.
        mechanism.allocate(vec![tight(1, c(0, 0, 5, 0), c(9, 0, 5, 30), 0.1)], &mut env, Tick(0)).unwrap();
        let out = mechanism.allocate(vec![tight(2, c(5, 0, 1, 0), c(5, 0, 9, 30), 0.5)], &mut env, Tick(1)).unwrap();
        let summary: Vec<_> = out
            .iter()
            .map(|a| (a.agent_id(), a.history.reason, a.history.displaced.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (AgentId(2), AllocationReason::FirstAllocation, vec![AgentId(1)]),
                (AgentId(1), AllocationReason::Reallocation, vec![]),
            ]
        );

        // Row z=8 meets agent 2 at (5,8) on t=9.
        let out = mechanism.allocate(vec![tight(3, c(0, 0, 8, 0), c(9, 0, 8, 40), 0.9)], &mut env, Tick(3)).unwrap();
        let summary: Vec<_> = out
            .iter()
            .map(|a| (a.agent_id(), a.history.reason, a.history.displaced.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (AgentId(3), AllocationReason::FirstAllocation, vec![AgentId(2)]),
                (AgentId(2), AllocationReason::Reallocation, vec![AgentId(1)]),
                (AgentId(1), AllocationReason::Reallocation, vec![]),
            ]
        );
        assert!(out.iter().all(|a| !a.is_failure()));
        assert!(out[1].history.bid.as_ref().unwrap().is_flying());
        assert!(out[2].history.bid.as_ref().unwrap().is_flying());

        // Elapsed cells are kept and the new plan continues from them.
        let one = segments_of(&env, 1);
        assert_eq!(one.len(), 1);
        assert_eq!((one[0].min(), one[0].max(), one[0].voxels()), (c(0, 0, 5, 2), c(9, 0, 5, 12), 11));
        let two = segments_of(&env, 2);
        assert_eq!(two.len(), 1);
        assert_eq!((two[0].min(), two[0].max(), two[0].voxels()), (c(5, 0, 1, 2), c(5, 0, 9, 11), 10));
        assert_eq!(segments_of(&env, 3)[0].max(), c(9, 0, 8, 13));

        let paths: Vec<_> = env
            .agents()
            .into_iter()
            .filter_map(|a| a.as_path())
            .map(|a| (a.id(), a.allocated_coords()))
            .collect();
        for (id, cells) in &paths {
            for w in cells.windows(2) {
                assert_eq!(w[1].t, w[0].t + 1, "{id} skips from {} to {}", w[0], w[1]);
                assert!(w[0].distance_l1(w[1]) <= 1, "{id} jumps from {} to {}", w[0], w[1]);
            }
        }
        for (i, (a, cells_a)) in paths.iter().enumerate() {
            for (b, cells_b) in &paths[i + 1..] {
                for x in cells_a {
                    assert!(!cells_b.contains(x), "{a} and {b} share {x}");
                }
            }
        }
    }

    #[test]
    fn permanently_blocked_stop_fails() {
        let mut env = world(c(10, 1, 10, 100), &[(Coordinate3D::new(6, 0, 2), Coordinate3D::new(3, 1, 3))]);
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        let out = mechanism
            .allocate(vec![Agent::Path(flight(1, c(0, 0, 0, 0), c(7, 0, 3, 20), 0.5))], &mut env, Tick(0))
            .unwrap();
        assert!(out[0].is_failure());
        assert!(out[0].history.explanation.contains("permanently blocked"));
        assert_eq!(env.agent_count(), 1);
    }

    #[test]
    fn battery_overrun_fails() {
        let mut env = corridor();
        let mut agent = flight(1, c(0, 0, 0, 0), c(9, 0, 0, 9), 0.5);
        agent.battery = 5;
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        let out = mechanism.allocate(vec![Agent::Path(agent)], &mut env, Tick(0)).unwrap();
        assert!(out[0].is_failure());
        assert!(out[0].history.explanation.contains("battery"));
    }

    #[test]
    fn exhausted_agent_fails_without_bid() {
        let mut env = open_sky();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        let out = mechanism.allocate(vec![plot(1, c(0, 0, 0, 0), c(1, 0, 1, 3), 0.5)], &mut env, Tick(10)).unwrap();
        assert!(out[0].is_failure());
        assert!(out[0].history.bid.is_none());
    }

    #[test]
    fn space_boxes_start_after_the_tick() {
        let mut env = open_sky();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        let out = mechanism.allocate(vec![plot(1, c(0, 0, 0, 0), c(2, 0, 2, 50), 0.2)], &mut env, Tick(0)).unwrap();
        assert_eq!(out[0].segments[0].min(), c(0, 0, 0, 1));
        assert_eq!(out[0].voxels(), 3 * 3 * 50);
    }

    #[test]
    fn higher_space_bid_takes_the_box() {
        let mut env = open_sky();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        mechanism.allocate(vec![plot(1, c(0, 0, 0, 0), c(2, 0, 2, 50), 0.2)], &mut env, Tick(0)).unwrap();

        let out = mechanism.allocate(vec![plot(2, c(0, 0, 0, 0), c(2, 0, 2, 50), 0.5)], &mut env, Tick(5)).unwrap();
        let winner = out.iter().find(|a| a.agent_id() == AgentId(2)).unwrap();
        assert_eq!(winner.history.displaced, vec![AgentId(1)]);
        assert_eq!(winner.voxels(), 3 * 3 * 45);
        assert_eq!(winner.payment, 3.0 * 3.0 * 45.0 * 0.5);

        let loser = out.iter().find(|a| a.agent_id() == AgentId(1)).unwrap();
        assert!(loser.is_failure());
        assert_eq!(loser.payment, 0.0);
        assert_eq!(env.agent(AgentId(1)).unwrap().allocated_voxels(), 3 * 3 * 4);
    }

    #[test]
    fn lower_or_equal_bids_never_displace() {
        let levels = [0.1, 0.5, 0.9];
        for &holder in &levels {
            for &bidder in levels.iter().filter(|&&p| p <= holder) {
                let mut env = open_sky();
                let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
                mechanism.allocate(vec![plot(1, c(0, 0, 0, 0), c(2, 0, 2, 50), holder)], &mut env, Tick(0)).unwrap();
                let out = mechanism
                    .allocate(vec![plot(2, c(1, 0, 1, 0), c(3, 0, 3, 50), bidder)], &mut env, Tick(2))
                    .unwrap();
                assert_eq!(out.len(), 1, "{bidder} vs {holder}");
                assert!(out[0].is_failure());
                assert_eq!(env.agent(AgentId(1)).unwrap().allocated_voxels(), 3 * 3 * 50);
            }
        }
    }

    #[test]
    fn fcfs_space_needs_an_empty_box() {
        let mut env = open_sky();
        let mut mechanism = Mechanism::fcfs(AStarConfig::default(), 1.0);
        mechanism.allocate(vec![plot(1, c(0, 0, 0, 0), c(2, 0, 2, 50), 0.1)], &mut env, Tick(0)).unwrap();
        let out = mechanism.allocate(vec![plot(2, c(2, 0, 2, 0), c(4, 0, 4, 50), 0.9)], &mut env, Tick(1)).unwrap();
        assert!(out[0].is_failure());
        assert!(out[0].history.explanation.contains("held by"));
    }

    #[test]
    fn no_two_granted_flights_come_too_close() {
        let mut env = open_sky();
        let mut mechanism = Mechanism::priority(AStarConfig::default(), 1.0);
        let agents = vec![
            Agent::Path(flight(1, c(0, 0, 5, 0), c(9, 0, 5, 20), 0.3)),
            Agent::Path(flight(2, c(5, 0, 0, 0), c(5, 0, 9, 20), 0.6)),
            Agent::Path(flight(3, c(9, 0, 9, 0), c(0, 0, 0, 40), 0.4)),
        ];
        mechanism.allocate(agents, &mut env, Tick(0)).unwrap();

        let paths: Vec<_> = env
            .agents()
            .into_iter()
            .filter_map(|a| a.as_path())
            .map(|a| (a.id(), a.allocated_coords()))
            .collect();
        for (i, (a, cells_a)) in paths.iter().enumerate() {
            for (b, cells_b) in &paths[i + 1..] {
                for x in cells_a {
                    for y in cells_b.iter().filter(|y| y.t == x.t) {
                        assert!(x.distance_l2(*y) > 1.0, "{a} at {x} and {b} at {y}");
                    }
                }
            }
        }
    }
}

// ── Payment rules ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod payment {
    use std::time::Duration;

    use sky_agent::{Allocation, AllocationReason, Bid, BidDemand, Segment, SpaceBid, SpaceSegment};
    use sky_core::{AgentId, AgentIdentity, Tick};
    use super::helpers::*;
    use crate::{BidTracker, PaymentRule, PriorityPaymentRule, VoxelPaymentRule};

    fn granted(id: u32, voxels_t: i64) -> Allocation {
        let segment = SpaceSegment::new(c(0, 0, 0, 1), c(1, 0, 1, voxels_t), 0);
        let bid = Bid { agent: AgentId(id), priority: 0.5, demand: BidDemand::Space(SpaceBid { blocks: vec![segment] }) };
        Allocation::granted(
            AgentIdentity::live(AgentId(id)),
            vec![Segment::Space(segment)],
            bid,
            AllocationReason::FirstAllocation,
            Duration::ZERO,
            vec![],
        )
    }

    #[test]
    fn doubling_price_doubles_every_payment() {
        let allocations = vec![granted(1, 10), granted(2, 3), Allocation::failed(AgentIdentity::live(AgentId(3)), None, "x", Duration::ZERO)];
        let tracker = BidTracker::new();
        let single = VoxelPaymentRule::new(1.5).payments(&allocations, &tracker);
        let double = VoxelPaymentRule::new(3.0).payments(&allocations, &tracker);
        for (id, pay) in &single {
            assert_eq!(double[id], 2.0 * pay);
        }
        assert_eq!(single[&AgentId(1)], 40.0 * 1.5);
        assert_eq!(single[&AgentId(3)], 0.0);
    }

    #[test]
    fn priority_rule_scales_by_max_priority() {
        let mut tracker = BidTracker::new();
        tracker.request_new_bid(Tick(0), &plot(1, c(0, 0, 0, 0), c(1, 0, 1, 10), 0.25));
        let allocations = vec![granted(1, 10), granted(2, 10)];
        let pay = PriorityPaymentRule::new(2.0).payments(&allocations, &tracker);
        assert_eq!(pay[&AgentId(1)], 40.0 * 2.0 * 0.25);
        assert_eq!(pay[&AgentId(2)], 0.0);
    }
}
