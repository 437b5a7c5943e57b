/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hickory_resolver::TokioResolver;
use indexmap::IndexSet;
use log::{debug, warn};
use tokio::sync::mpsc;

use crate::{
    QueryDriver, QueryError, QueryEvent, QueryFamilies, QueryServerError, QuerySubscription,
};

struct LookupAnswer {
    addrs: Vec<IpAddr>,
    valid_until: Option<Instant>,
}

type LookupResult = Result<LookupAnswer, QueryError>;

/// Queries unicast DNS through a shared hickory resolver.
pub struct HickoryDriver {
    resolver: TokioResolver,
    refresh: Option<(Duration, Duration)>,
}

impl HickoryDriver {
    pub(super) fn new(resolver: TokioResolver, refresh: Option<(Duration, Duration)>) -> Self {
        HickoryDriver { resolver, refresh }
    }
}

async fn lookup_v4(resolver: &TokioResolver, domain: &str) -> LookupResult {
    let lookup = resolver.ipv4_lookup(domain).await?;
    let addrs = lookup.iter().map(|r| IpAddr::V4(r.0)).collect();
    Ok(LookupAnswer {
        addrs,
        valid_until: Some(lookup.valid_until()),
    })
}

async fn lookup_v6(resolver: &TokioResolver, domain: &str) -> LookupResult {
    let lookup = resolver.ipv6_lookup(domain).await?;
    let addrs = lookup.iter().map(|r| IpAddr::V6(r.0)).collect();
    Ok(LookupAnswer {
        addrs,
        valid_until: Some(lookup.valid_until()),
    })
}

async fn lookup(
    resolver: &TokioResolver,
    domain: &str,
    families: QueryFamilies,
) -> LookupResult {
    match families {
        QueryFamilies::Ipv4 => lookup_v4(resolver, domain).await,
        QueryFamilies::Ipv6 => lookup_v6(resolver, domain).await,
        QueryFamilies::Both => {
            let (r4, r6) = tokio::join!(
                lookup_v4(resolver, domain),
                lookup_v6(resolver, domain)
            );
            merge(r4, r6)
        }
    }
}

fn merge(r1: LookupResult, r2: LookupResult) -> LookupResult {
    match (r1, r2) {
        (Ok(a1), Ok(a2)) => {
            let mut addrs = a1.addrs;
            addrs.extend(a2.addrs);
            let valid_until = match (a1.valid_until, a2.valid_until) {
                (Some(t1), Some(t2)) => Some(t1.min(t2)),
                (t1, t2) => t1.or(t2),
            };
            Ok(LookupAnswer { addrs, valid_until })
        }
        (Err(QueryError::FromServer(QueryServerError::NotFound)), _)
        | (_, Err(QueryError::FromServer(QueryServerError::NotFound))) => {
            Err(QueryServerError::NotFound.into())
        }
        (Ok(a), Err(QueryError::NoRecords)) | (Err(QueryError::NoRecords), Ok(a)) => Ok(a),
        (Err(QueryError::NoRecords), Err(QueryError::NoRecords)) => Err(QueryError::NoRecords),
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

/// Track the set of addresses seen so far and turn new answers into diffs.
#[derive(Default)]
struct AnswerTracker {
    current: IndexSet<IpAddr>,
}

impl AnswerTracker {
    fn update(&mut self, addrs: Vec<IpAddr>) -> Option<QueryEvent> {
        let new: IndexSet<IpAddr> = addrs.into_iter().collect();
        let added: Vec<IpAddr> = new.difference(&self.current).copied().collect();
        let removed: Vec<IpAddr> = self.current.difference(&new).copied().collect();
        self.current = new;
        if added.is_empty() && removed.is_empty() {
            None
        } else {
            Some(QueryEvent::Update { added, removed })
        }
    }
}

fn refresh_interval(valid_until: Option<Instant>, min: Duration, max: Duration) -> Duration {
    let ttl = valid_until
        .map(|t| t.saturating_duration_since(Instant::now()))
        .unwrap_or(max);
    ttl.clamp(min, max)
}

async fn run_query(
    resolver: TokioResolver,
    domain: Arc<str>,
    families: QueryFamilies,
    refresh: Option<(Duration, Duration)>,
    sender: mpsc::UnboundedSender<QueryEvent>,
) {
    let mut tracker = AnswerTracker::default();

    let answer = match lookup(&resolver, &domain, families).await {
        Ok(answer) => answer,
        Err(e) => {
            debug!("query for {domain} failed: {e}");
            let _ = sender.send(QueryEvent::Failed(e));
            return;
        }
    };
    let mut valid_until = answer.valid_until;
    if let Some(ev) = tracker.update(answer.addrs) {
        if sender.send(ev).is_err() {
            return;
        }
    }

    let Some((min, max)) = refresh else {
        let _ = sender.send(QueryEvent::Finished);
        return;
    };

    loop {
        tokio::time::sleep(refresh_interval(valid_until, min, max)).await;
        if sender.is_closed() {
            return;
        }

        let addrs = match lookup(&resolver, &domain, families).await {
            Ok(answer) => {
                valid_until = answer.valid_until;
                answer.addrs
            }
            Err(QueryError::NoRecords | QueryError::FromServer(QueryServerError::NotFound)) => {
                valid_until = None;
                Vec::new()
            }
            Err(e) => {
                warn!("refresh query for {domain} failed: {e}");
                valid_until = None;
                continue;
            }
        };
        if let Some(ev) = tracker.update(addrs) {
            if sender.send(ev).is_err() {
                return;
            }
        }
    }
}

impl QueryDriver for HickoryDriver {
    fn subscribe(
        &self,
        target: Arc<str>,
        families: QueryFamilies,
        sender: mpsc::UnboundedSender<QueryEvent>,
    ) -> QuerySubscription {
        let resolver = self.resolver.clone();
        let task = tokio::spawn(run_query(resolver, target, families, self.refresh, sender));
        QuerySubscription::new(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QueryDriverError;

    fn answer(addrs: &[&str]) -> LookupResult {
        Ok(LookupAnswer {
            addrs: addrs.iter().map(|s| s.parse().unwrap()).collect(),
            valid_until: None,
        })
    }

    #[test]
    fn merge_results() {
        let r = merge(answer(&["192.0.2.1"]), answer(&["2001:db8::1"])).unwrap();
        assert_eq!(r.addrs.len(), 2);

        let r = merge(answer(&["192.0.2.1"]), Err(QueryError::NoRecords)).unwrap();
        assert_eq!(r.addrs, vec!["192.0.2.1".parse::<IpAddr>().unwrap()]);

        let e = merge(Err(QueryError::NoRecords), Err(QueryError::NoRecords))
            .err()
            .unwrap();
        assert_eq!(e, QueryError::NoRecords);

        let e = merge(
            Err(QueryDriverError::Timeout.into()),
            Err(QueryServerError::NotFound.into()),
        )
        .err()
        .unwrap();
        assert_eq!(e, QueryError::FromServer(QueryServerError::NotFound));

        let e = merge(answer(&["192.0.2.1"]), Err(QueryDriverError::Timeout.into()))
            .err()
            .unwrap();
        assert_eq!(e, QueryError::FromDriver(QueryDriverError::Timeout));
    }

    #[test]
    fn tracker_diff() {
        let a1: IpAddr = "192.0.2.1".parse().unwrap();
        let a2: IpAddr = "192.0.2.2".parse().unwrap();
        let mut tracker = AnswerTracker::default();
        assert_eq!(tracker.update(vec![a1]), Some(QueryEvent::added(vec![a1])));
        assert_eq!(tracker.update(vec![a1]), None);
        assert_eq!(
            tracker.update(vec![a2]),
            Some(QueryEvent::Update {
                added: vec![a2],
                removed: vec![a1],
            })
        );
        assert_eq!(tracker.update(vec![]), Some(QueryEvent::removed(vec![a2])));
    }

    #[test]
    fn refresh_clamp() {
        let min = Duration::from_secs(5);
        let max = Duration::from_secs(60);
        assert_eq!(refresh_interval(None, min, max), max);
        assert_eq!(refresh_interval(Some(Instant::now()), min, max), min);
        let far = Instant::now() + Duration::from_secs(3600);
        assert_eq!(refresh_interval(Some(far), min, max), max);
    }
}
