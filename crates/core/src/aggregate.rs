use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    DailyUsage, ModelUsage, ProjectUsage, Provider, ProviderUsage, SessionRecord, UsageSnapshot,
    UsageTotals,
};

/// Sessions taken from each provider's newest-first list before pooling.
pub const RECENT_PER_PROVIDER: usize = 10;
/// Overall cap on the pooled recent-sessions list.
pub const RECENT_LIMIT: usize = 20;

const UNKNOWN_MODEL: &str = "unknown";

/// One provider's stored sessions, already ordered by `last_message` descending.
#[derive(Debug, Clone, Copy)]
pub struct ProviderSessions<'a> {
    pub provider: Provider,
    pub available: bool,
    pub sessions: &'a [SessionRecord],
}

fn parse_ts(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn ts_millis(value: Option<&str>) -> i64 {
    value
        .and_then(parse_ts)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

fn utc_date(value: &str) -> Option<String> {
    parse_ts(value).map(|dt| dt.format("%Y-%m-%d").to_string())
}

#[derive(Default)]
struct ProjectAcc {
    providers: BTreeSet<Provider>,
    totals: UsageTotals,
    last_activity: Option<(i64, String)>,
}

/// Folds every provider's sessions into a [`UsageSnapshot`].
pub fn compute_usage(inputs: &[ProviderSessions<'_>], generated_at: DateTime<Utc>) -> UsageSnapshot {
    let mut providers = BTreeMap::new();
    let mut totals = UsageTotals::default();
    let mut models: BTreeMap<String, ModelUsage> = BTreeMap::new();
    let mut dates: BTreeMap<String, DailyUsage> = BTreeMap::new();
    let mut projects: BTreeMap<String, ProjectAcc> = BTreeMap::new();
    let mut recent: Vec<&SessionRecord> = Vec::new();

    for input in inputs {
        let mut provider_totals = UsageTotals::default();
        for session in input.sessions {
            provider_totals.add_session(session);

            let model_key = session
                .model
                .clone()
                .unwrap_or_else(|| UNKNOWN_MODEL.to_string());
            let model = models.entry(model_key.clone()).or_insert_with(|| ModelUsage {
                model: model_key,
                sessions: 0,
                input_tokens: 0,
                output_tokens: 0,
                total_tokens: 0,
                cost_usd: 0.0,
            });
            model.sessions += 1;
            model.input_tokens = model.input_tokens.saturating_add(session.input_tokens);
            model.output_tokens = model.output_tokens.saturating_add(session.output_tokens);
            model.total_tokens = model.input_tokens.saturating_add(model.output_tokens);
            model.cost_usd += session.cost_usd;

            if let Some(date) = session.last_message.as_deref().and_then(utc_date) {
                let day = dates.entry(date.clone()).or_insert_with(|| DailyUsage {
                    date,
                    sessions: 0,
                    messages: 0,
                    input_tokens: 0,
                    output_tokens: 0,
                    total_tokens: 0,
                    cost_usd: 0.0,
                });
                day.sessions += 1;
                day.messages = day.messages.saturating_add(session.messages);
                day.input_tokens = day.input_tokens.saturating_add(session.input_tokens);
                day.output_tokens = day.output_tokens.saturating_add(session.output_tokens);
                day.total_tokens = day.input_tokens.saturating_add(day.output_tokens);
                day.cost_usd += session.cost_usd;
            }

            let label = session
                .project
                .clone()
                .unwrap_or_else(|| format!("{}-sessions", input.provider));
            let project = projects.entry(label).or_default();
            project.providers.insert(input.provider);
            project.totals.add_session(session);
            if let Some(last) = session.last_message.as_deref()
                && let Some(ts) = parse_ts(last)
            {
                let millis = ts.timestamp_millis();
                let newer = project
                    .last_activity
                    .as_ref()
                    .is_none_or(|(current, _)| millis > *current);
                if newer {
                    project.last_activity = Some((millis, last.to_string()));
                }
            }
        }

        recent.extend(input.sessions.iter().take(RECENT_PER_PROVIDER));
        totals.merge(&provider_totals);
        providers.insert(
            input.provider,
            ProviderUsage {
                available: input.available,
                totals: provider_totals,
            },
        );
    }

    let mut by_model: Vec<ModelUsage> = models.into_values().collect();
    by_model.sort_by(|a, b| {
        b.cost_usd
            .total_cmp(&a.cost_usd)
            .then_with(|| a.model.cmp(&b.model))
    });

    let by_date: Vec<DailyUsage> = dates.into_values().collect();

    let mut by_project: Vec<(i64, ProjectUsage)> = projects
        .into_iter()
        .map(|(project, acc)| {
            let sort_key = acc.last_activity.as_ref().map(|(millis, _)| *millis);
            let usage = ProjectUsage {
                project,
                providers: acc.providers.into_iter().collect(),
                sessions: acc.totals.sessions,
                messages: acc.totals.messages,
                input_tokens: acc.totals.input_tokens,
                output_tokens: acc.totals.output_tokens,
                total_tokens: acc.totals.total_tokens,
                cost_usd: acc.totals.cost_usd,
                last_activity: acc.last_activity.map(|(_, raw)| raw),
            };
            (sort_key.unwrap_or(i64::MIN), usage)
        })
        .collect();
    by_project.sort_by(|(a_key, a), (b_key, b)| {
        b_key.cmp(a_key).then_with(|| a.project.cmp(&b.project))
    });

    recent.sort_by_key(|session| std::cmp::Reverse(ts_millis(session.last_message.as_deref())));
    let recent_sessions = recent
        .into_iter()
        .take(RECENT_LIMIT)
        .cloned()
        .collect();

    UsageSnapshot {
        providers,
        totals,
        by_model,
        by_date,
        by_project: by_project.into_iter().map(|(_, usage)| usage).collect(),
        recent_sessions,
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(provider: Provider, path: &str, last: Option<&str>) -> SessionRecord {
        let mut record = SessionRecord::empty(provider, path, path);
        record.last_message = last.map(str::to_string);
        record.messages = 1;
        record.input_tokens = 10;
        record.output_tokens = 5;
        record.cost_usd = 0.5;
        record
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("timestamp")
    }

    #[test]
    fn empty_input_yields_zero_snapshot() {
        let snapshot = compute_usage(
            &[ProviderSessions {
                provider: Provider::Gemini,
                available: false,
                sessions: &[],
            }],
            now(),
        );
        assert_eq!(snapshot.totals, UsageTotals::default());
        assert!(!snapshot.providers[&Provider::Gemini].available);
        assert!(snapshot.recent_sessions.is_empty());
        assert!(snapshot.by_project.is_empty());
    }

    #[test]
    fn project_tracks_latest_activity() {
        let mut a = session(Provider::Claude, "a", Some("2024-01-01T00:00:00.000Z"));
        let mut b = session(Provider::Claude, "b", Some("2024-01-03T00:00:00.000Z"));
        a.project = Some("code/app".to_string());
        b.project = Some("code/app".to_string());
        let sessions = vec![b, a];
        let snapshot = compute_usage(
            &[ProviderSessions {
                provider: Provider::Claude,
                available: true,
                sessions: &sessions,
            }],
            now(),
        );
        assert_eq!(snapshot.by_project.len(), 1);
        let project = &snapshot.by_project[0];
        assert_eq!(project.sessions, 2);
        assert_eq!(project.last_activity.as_deref(), Some("2024-01-03T00:00:00.000Z"));
        assert_eq!(project.providers, vec![Provider::Claude]);
    }

    #[test]
    fn missing_project_and_model_use_synthetic_buckets() {
        let sessions = vec![session(Provider::Codex, "a", None)];
        let snapshot = compute_usage(
            &[ProviderSessions {
                provider: Provider::Codex,
                available: true,
                sessions: &sessions,
            }],
            now(),
        );
        assert_eq!(snapshot.by_project[0].project, "codex-sessions");
        assert_eq!(snapshot.by_project[0].last_activity, None);
        assert_eq!(snapshot.by_model[0].model, "unknown");
        assert!(snapshot.by_date.is_empty());
        assert_eq!(snapshot.totals.sessions, 1);
        assert_eq!(snapshot.totals.total_tokens, 15);
    }

    #[test]
    fn dates_bucket_by_utc_day() {
        let sessions = vec![
            session(Provider::Claude, "a", Some("2024-05-02T01:00:00+03:00")),
            session(Provider::Claude, "b", Some("2024-05-02T10:00:00Z")),
        ];
        let snapshot = compute_usage(
            &[ProviderSessions {
                provider: Provider::Claude,
                available: true,
                sessions: &sessions,
            }],
            now(),
        );
        let dates: Vec<&str> = snapshot.by_date.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-01", "2024-05-02"]);
    }

    #[test]
    fn recent_sessions_pool_caps_and_sorts() {
        let claude: Vec<SessionRecord> = (0..15)
            .rev()
            .map(|i| {
                session(
                    Provider::Claude,
                    &format!("c{i}"),
                    Some(&format!("2024-02-{:02}T00:00:00.000Z", i + 1)),
                )
            })
            .collect();
        let mut codex: Vec<SessionRecord> = (0..12)
            .rev()
            .map(|i| {
                session(
                    Provider::Codex,
                    &format!("x{i}"),
                    Some(&format!("2024-03-{:02}T12:00:00.000Z", i + 1)),
                )
            })
            .collect();
        codex.push(session(Provider::Codex, "undated", None));
        let gemini = vec![session(Provider::Gemini, "g", None)];
        let snapshot = compute_usage(
            &[
                ProviderSessions {
                    provider: Provider::Claude,
                    available: true,
                    sessions: &claude,
                },
                ProviderSessions {
                    provider: Provider::Codex,
                    available: true,
                    sessions: &codex,
                },
                ProviderSessions {
                    provider: Provider::Gemini,
                    available: true,
                    sessions: &gemini,
                },
            ],
            now(),
        );
        assert_eq!(snapshot.recent_sessions.len(), RECENT_LIMIT);
        let stamps: Vec<i64> = snapshot
            .recent_sessions
            .iter()
            .map(|s| ts_millis(s.last_message.as_deref()))
            .collect();
        assert!(stamps.windows(2).all(|pair| pair[0] > pair[1] || pair[1] == 0));
        assert_eq!(snapshot.recent_sessions[0].path, "x11");
        // 10 codex + 10 claude fill the cap; undated sessions fall off the end.
        assert!(snapshot.recent_sessions.iter().all(|s| s.last_message.is_some()));
        assert_eq!(snapshot.totals.sessions, 29);
    }

    #[test]
    fn undated_sessions_sort_last() {
        let claude = vec![session(Provider::Claude, "undated", None)];
        let gemini = vec![session(Provider::Gemini, "dated", Some("2024-01-01T00:00:00.000Z"))];
        let snapshot = compute_usage(
            &[
                ProviderSessions {
                    provider: Provider::Claude,
                    available: true,
                    sessions: &claude,
                },
                ProviderSessions {
                    provider: Provider::Gemini,
                    available: true,
                    sessions: &gemini,
                },
            ],
            now(),
        );
        let paths: Vec<&str> = snapshot
            .recent_sessions
            .iter()
            .map(|s| s.path.as_str())
            .collect();
        assert_eq!(paths, vec!["dated", "undated"]);
    }
}
