//! The matching engine.
//!
//! Partitions a participant pool into groups of a requested size,
//! preferring groupings that avoid recently-met pairs. Pure function over
//! its inputs; persistence and notification happen in the caller.

use rand::seq::SliceRandom;
use rand::thread_rng;
use std::collections::HashSet;

use crate::error::DomainError;
use crate::models::meeting::{MatchOutcome, UserPair};
use crate::models::user::User;

/// A greedy pass can strand a recently-met pair in the last group even
/// when a conflict-free grouping exists, so conflicted attempts are
/// reshuffled up to this many times before the best attempt is accepted.
const MAX_SHUFFLE_ATTEMPTS: usize = 25;

/// Partition `users` into groups of exactly `group_size`.
///
/// The pool is shuffled so outcomes are unbiased across runs. Groups are
/// then built greedily: each group takes a seed user and fills its
/// remaining slots with the first candidate that forms no pair in
/// `prev_pairs` with anyone already in the group; ties between
/// history-free candidates follow the shuffled order. When every remaining
/// candidate conflicts, the one with the fewest conflicting pairs is taken
/// instead: history avoidance is a preference, not a hard guarantee, and a
/// full group is always emitted while enough users remain. An attempt that
/// still contains a recent pair is retried with a fresh shuffle; after
/// [`MAX_SHUFFLE_ATTEMPTS`] the attempt with the fewest conflicts wins.
///
/// Users left over when fewer than `group_size` remain are returned as
/// unmatched; `unmatched.len() == users.len() % group_size` always holds,
/// and no group smaller than `group_size` is ever produced.
///
/// An empty pool is valid and yields empty groups and unmatched. The only
/// error is a `group_size` below two.
pub fn generate_meetings(
    users: Vec<User>,
    prev_pairs: &HashSet<UserPair>,
    group_size: usize,
) -> Result<MatchOutcome, DomainError> {
    if group_size < 2 {
        return Err(DomainError::Configuration(format!(
            "Group size must be at least 2, got {}",
            group_size
        )));
    }

    let mut rng = thread_rng();
    let mut best = greedy_partition(&users, prev_pairs, group_size, &mut rng);
    let mut best_conflicts = conflict_count(&best, prev_pairs);

    for _ in 1..MAX_SHUFFLE_ATTEMPTS {
        if best_conflicts == 0 {
            break;
        }
        let outcome = greedy_partition(&users, prev_pairs, group_size, &mut rng);
        let conflicts = conflict_count(&outcome, prev_pairs);
        if conflicts < best_conflicts {
            best = outcome;
            best_conflicts = conflicts;
        }
    }

    Ok(best)
}

/// One shuffled greedy pass over the pool.
fn greedy_partition(
    users: &[User],
    prev_pairs: &HashSet<UserPair>,
    group_size: usize,
    rng: &mut impl rand::Rng,
) -> MatchOutcome {
    let mut pool = users.to_vec();
    pool.shuffle(rng);

    let mut groups = Vec::with_capacity(pool.len() / group_size);
    while pool.len() >= group_size {
        let mut group = vec![pool.remove(0)];
        while group.len() < group_size {
            let idx = pick_candidate(&group, &pool, prev_pairs);
            group.push(pool.remove(idx));
        }
        groups.push(group);
    }

    MatchOutcome {
        groups,
        unmatched: pool,
    }
}

/// Number of recently-met pairs the outcome places together.
fn conflict_count(outcome: &MatchOutcome, prev_pairs: &HashSet<UserPair>) -> usize {
    outcome
        .groups
        .iter()
        .map(|group| {
            let mut conflicts = 0;
            for (i, a) in group.iter().enumerate() {
                for b in &group[i + 1..] {
                    if prev_pairs.contains(&UserPair::new(a.id, b.id)) {
                        conflicts += 1;
                    }
                }
            }
            conflicts
        })
        .sum()
}

/// Index of the preferred next member for the forming group.
///
/// First conflict-free candidate in pool order wins; otherwise the
/// candidate with the fewest prior pairings against the group. Ties keep
/// pool order, which is the shuffled input order.
fn pick_candidate(group: &[User], pool: &[User], prev_pairs: &HashSet<UserPair>) -> usize {
    let mut best = 0;
    let mut best_conflicts = usize::MAX;
    for (idx, candidate) in pool.iter().enumerate() {
        let conflicts = group
            .iter()
            .filter(|member| prev_pairs.contains(&UserPair::new(member.id, candidate.id)))
            .count();
        if conflicts == 0 {
            return idx;
        }
        if conflicts < best_conflicts {
            best_conflicts = conflicts;
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn users(n: usize) -> Vec<User> {
        (0..n)
            .map(|i| User {
                id: Uuid::new_v4(),
                email: format!("user{}@example.com", i),
                full_name: format!("User {}", i),
                photo_url: None,
                is_active: true,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .collect()
    }

    fn no_history() -> HashSet<UserPair> {
        HashSet::new()
    }

    #[test]
    fn test_empty_pool() {
        let outcome = generate_meetings(Vec::new(), &no_history(), 2).unwrap();
        assert!(outcome.groups.is_empty());
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_pool_smaller_than_group_size() {
        let pool = users(3);
        let outcome = generate_meetings(pool.clone(), &no_history(), 4).unwrap();
        assert!(outcome.groups.is_empty());
        assert_eq!(outcome.unmatched.len(), 3);
    }

    #[test]
    fn test_six_users_pair_matching() {
        let outcome = generate_meetings(users(6), &no_history(), 2).unwrap();
        assert_eq!(outcome.groups.len(), 3);
        assert!(outcome.unmatched.is_empty());
        for group in &outcome.groups {
            assert_eq!(group.len(), 2);
        }
    }

    #[test]
    fn test_five_users_pair_matching_leaves_one() {
        let outcome = generate_meetings(users(5), &no_history(), 2).unwrap();
        assert_eq!(outcome.groups.len(), 2);
        assert_eq!(outcome.unmatched.len(), 1);
    }

    #[test]
    fn test_unmatched_count_is_pool_mod_group_size() {
        for pool_size in 0..12 {
            for group_size in 2..5 {
                let outcome = generate_meetings(users(pool_size), &no_history(), group_size).unwrap();
                assert_eq!(
                    outcome.unmatched.len(),
                    pool_size % group_size,
                    "pool {} size {}",
                    pool_size,
                    group_size
                );
                for group in &outcome.groups {
                    assert_eq!(group.len(), group_size);
                }
            }
        }
    }

    #[test]
    fn test_no_user_appears_twice() {
        let pool = users(9);
        let outcome = generate_meetings(pool.clone(), &no_history(), 3).unwrap();
        let mut seen = HashSet::new();
        for user in outcome.groups.iter().flatten().chain(outcome.unmatched.iter()) {
            assert!(seen.insert(user.id), "user placed twice");
        }
        assert_eq!(seen.len(), pool.len());
    }

    #[test]
    fn test_group_size_below_two_is_configuration_error() {
        for bad in [0, 1] {
            let err = generate_meetings(users(4), &no_history(), bad).unwrap_err();
            assert!(matches!(err, DomainError::Configuration(_)));
        }
    }

    #[test]
    fn test_recent_pair_avoided_when_alternative_exists() {
        // Four users with one recent pair: the engine must never re-pair
        // them, whatever the shuffle order, because an alternative pairing
        // always exists.
        let pool = users(4);
        let recent = UserPair::new(pool[0].id, pool[1].id);
        let history: HashSet<UserPair> = [recent].into_iter().collect();

        for _ in 0..100 {
            let outcome = generate_meetings(pool.clone(), &history, 2).unwrap();
            assert_eq!(outcome.groups.len(), 2);
            for group in &outcome.groups {
                let pair = UserPair::new(group[0].id, group[1].id);
                assert_ne!(pair, recent, "recently-met pair was re-matched");
            }
        }
    }

    #[test]
    fn test_saturated_history_still_emits_full_groups() {
        // Every possible pair has met: the soft constraint must not block
        // placement.
        let pool = users(6);
        let mut history = HashSet::new();
        for a in &pool {
            for b in &pool {
                if a.id != b.id {
                    history.insert(UserPair::new(a.id, b.id));
                }
            }
        }

        let outcome = generate_meetings(pool, &history, 2).unwrap();
        assert_eq!(outcome.groups.len(), 3);
        assert!(outcome.unmatched.is_empty());
        for group in &outcome.groups {
            assert_eq!(group.len(), 2);
        }
    }

    #[test]
    fn test_fallback_prefers_fewest_conflicts() {
        // Group of 3 forming around a seed that has met everyone except
        // one candidate; that candidate must be chosen first.
        let pool = users(3);
        let mut history = HashSet::new();
        history.insert(UserPair::new(pool[0].id, pool[1].id));

        for _ in 0..50 {
            let outcome = generate_meetings(pool.clone(), &history, 3).unwrap();
            assert_eq!(outcome.groups.len(), 1);
            assert_eq!(outcome.groups[0].len(), 3);
        }
    }

    #[test]
    fn test_larger_groups_avoid_history() {
        // Six users, two recent pairs; with group_size 3 a conflict-free
        // partition exists often enough that conflicts should be rare, but
        // the hard guarantees are size and coverage.
        let pool = users(6);
        let mut history = HashSet::new();
        history.insert(UserPair::new(pool[0].id, pool[1].id));
        history.insert(UserPair::new(pool[2].id, pool[3].id));

        let outcome = generate_meetings(pool, &history, 3).unwrap();
        assert_eq!(outcome.groups.len(), 2);
        assert!(outcome.unmatched.is_empty());
    }

    #[test]
    fn test_matched_users_helper() {
        let outcome = generate_meetings(users(7), &no_history(), 3).unwrap();
        assert_eq!(outcome.matched_users(), 6);
        assert_eq!(outcome.unmatched.len(), 1);
    }
}
