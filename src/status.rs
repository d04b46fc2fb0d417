//! Status of each boundary across the local branch, its remote copy and its
//! pull request.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::boundary::{self, BoundaryRules};
use crate::changeset;
use crate::context::RepoContext;
use crate::error::Result;
use crate::ports::clock::Clock;
use crate::ports::git::GitRepo;
use crate::ports::hosting::{CodeHost, Review, ReviewState};

/// Reconciled state of one mirrored branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchStatus {
    /// Pull request URL, or a compare URL when no pull request exists.
    pub url: String,
    /// The mirrored branch is at least as new as the source state.
    pub is_local_up_to_date: bool,
    /// The pushed branch is at least as new as the local one.
    pub is_remote_up_to_date: bool,
    /// A pull request for the branch has been merged.
    pub is_merged: bool,
    /// Approved, with no fresh change requests. Always set when merged.
    pub is_approved: bool,
}

/// Status of every boundary of the current changes, in boundary name order.
///
/// # Errors
///
/// Returns an error if git cannot be queried or a GitHub call fails.
pub async fn status(
    git: &dyn GitRepo,
    host: &dyn CodeHost,
    clock: &dyn Clock,
    repo: &RepoContext,
    rules: &BoundaryRules,
) -> Result<Vec<(String, BranchStatus)>> {
    let boundaries = changeset::current_boundaries(git, repo, rules)?;
    let reference = reference_time(git, clock)?;
    debug!(%reference, count = boundaries.len(), "computing status");

    let mut rows = Vec::with_capacity(boundaries.len());
    for boundary in boundaries {
        let branch = boundary.branch_name(&repo.current_branch);
        let status = branch_status(git, host, repo, &branch, reference).await?;
        rows.push((branch, status));
    }
    Ok(rows)
}

/// HEAD's commit time on a clean tree; uncommitted work is as new as now.
fn reference_time(git: &dyn GitRepo, clock: &dyn Clock) -> Result<DateTime<Utc>> {
    if git.is_working_tree_clean()? {
        Ok(git.last_commit_time("HEAD")?.unwrap_or_default())
    } else {
        Ok(clock.now())
    }
}

async fn branch_status(
    git: &dyn GitRepo,
    host: &dyn CodeHost,
    repo: &RepoContext,
    branch: &str,
    reference: DateTime<Utc>,
) -> Result<BranchStatus> {
    let local_time = git.last_commit_time(branch)?;
    let remote_time = git
        .last_commit_time(&repo.remote_ref(branch))?
        .unwrap_or_default();
    let mut status = BranchStatus {
        url: repo.compare_url(branch),
        is_local_up_to_date: local_time.unwrap_or_default() >= reference,
        // A branch that was never mirrored has nothing to push.
        is_remote_up_to_date: local_time.is_some_and(|local| remote_time >= local),
        ..BranchStatus::default()
    };

    let pull_requests = host
        .list_pull_requests(&repo.remote, Some(branch), &repo.main_branch)
        .await?;
    if let Some(merged) = pull_requests.iter().find(|pr| pr.is_merged()) {
        status.url.clone_from(&merged.html_url);
        status.is_merged = true;
        status.is_approved = true;
    } else if let Some(open) = pull_requests.iter().find(|pr| pr.is_open()) {
        let reviews = host.list_reviews(&repo.remote, open.number).await?;
        status.url.clone_from(&open.html_url);
        status.is_approved = is_approved(&reviews, remote_time);
    }
    debug!(%branch, ?status, "branch status");
    Ok(status)
}

/// At least one approval and no change requests among the reviews
/// submitted since `since`.
fn is_approved(reviews: &[Review], since: DateTime<Utc>) -> bool {
    let count = |state: ReviewState| {
        reviews
            .iter()
            .filter(|r| r.state == state && r.submitted_at.is_some_and(|at| at >= since))
            .count()
    };
    count(ReviewState::Approved) > 0 && count(ReviewState::ChangesRequested) == 0
}

fn symbol(ok: bool) -> &'static str {
    if ok {
        "✅"
    } else {
        "⛔"
    }
}

/// Renders the status table printed by `erised status`.
#[must_use]
pub fn render_status(rows: &[(String, BranchStatus)]) -> String {
    let mut out = String::from("💻 | 🌐 | 🧐 / URL\n-- | -- | --------\n");
    for (branch, status) in rows {
        let review = if status.is_merged {
            "⤴️"
        } else {
            symbol(status.is_approved)
        };
        out.push_str(&format!(
            "{} | {} | {} / {} ({})\n",
            symbol(status.is_local_up_to_date),
            symbol(status.is_remote_up_to_date),
            review,
            boundary::short_name(branch),
            status.url,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{pull_request, FixedClock, MemoryCodeHost, MemoryGitRepo};
    use crate::context::RemoteIdentity;
    use crate::ports::hosting::PullRequestState;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap()
    }

    fn review(state: ReviewState, submitted_at: Option<DateTime<Utc>>) -> Review {
        Review { state, submitted_at }
    }

    fn repo() -> RepoContext {
        RepoContext {
            root: "/repo".into(),
            current_branch: "feat".into(),
            main_branch: "main".into(),
            remote: RemoteIdentity {
                remote: "origin".into(),
                owner: "acme".into(),
                name: "widgets".into(),
            },
        }
    }

    fn rules() -> BoundaryRules {
        BoundaryRules::new(["packages/*"])
    }

    /// `feat` was committed on day 10; `packages/foo` is mirrored and pushed
    /// after it, `packages/bar` was never mirrored.
    fn git() -> MemoryGitRepo {
        MemoryGitRepo::new("feat")
            .with_branch("feat", at(10))
            .with_branch("feat.erised.packages_foo", at(11))
            .with_remote_branch("origin/feat.erised.packages_foo", at(11))
            .with_changed_files(&["packages/foo/a.js", "packages/bar/b.js"])
    }

    async fn run(git: &MemoryGitRepo, host: &MemoryCodeHost) -> Vec<(String, BranchStatus)> {
        status(git, host, &FixedClock(at(20)), &repo(), &rules())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn compares_branch_times() {
        let rows = run(&git(), &MemoryCodeHost::new()).await;

        let (bar_branch, bar) = &rows[0];
        assert_eq!(bar_branch, "feat.erised.packages_bar");
        assert!(!bar.is_local_up_to_date);
        assert!(!bar.is_remote_up_to_date);
        assert_eq!(
            bar.url,
            "https://github.com/acme/widgets/compare/main...feat.erised.packages_bar"
        );

        let (_, foo) = &rows[1];
        assert!(foo.is_local_up_to_date);
        assert!(foo.is_remote_up_to_date);
        assert!(!foo.is_approved);
    }

    #[tokio::test]
    async fn stale_push_is_reported() {
        let git = git().with_remote_branch("origin/feat.erised.packages_foo", at(9));
        let rows = run(&git, &MemoryCodeHost::new()).await;
        assert!(!rows[1].1.is_remote_up_to_date);
    }

    #[tokio::test]
    async fn dirty_tree_compares_against_now() {
        let git = git().with_dirty(&[" M packages/foo/a.js"]);
        let rows = run(&git, &MemoryCodeHost::new()).await;
        assert!(!rows[1].1.is_local_up_to_date);
    }

    #[tokio::test]
    async fn merged_pull_request_wins() {
        let host = MemoryCodeHost::new()
            .with_pull_request(pull_request(
                1,
                "feat.erised.packages_foo",
                "main",
                PullRequestState::Open,
                None,
            ))
            .with_pull_request(pull_request(
                2,
                "feat.erised.packages_foo",
                "main",
                PullRequestState::Closed,
                Some(at(12)),
            ));

        let rows = run(&git(), &host).await;

        let foo = &rows[1].1;
        assert!(foo.is_merged);
        assert!(foo.is_approved);
        assert_eq!(foo.url, "https://github.com/acme/widgets/pull/2");
    }

    #[tokio::test]
    async fn only_fresh_reviews_count() {
        let open = pull_request(
            3,
            "feat.erised.packages_foo",
            "main",
            PullRequestState::Open,
            None,
        );
        let reviews = vec![
            review(ReviewState::ChangesRequested, Some(at(10))),
            review(ReviewState::Approved, Some(at(11))),
            review(ReviewState::Other, None),
        ];
        let host = MemoryCodeHost::new()
            .with_pull_request(open)
            .with_reviews(3, reviews);

        let rows = run(&git(), &host).await;

        let foo = &rows[1].1;
        assert!(foo.is_approved);
        assert!(!foo.is_merged);
        assert_eq!(foo.url, "https://github.com/acme/widgets/pull/3");
    }

    #[test]
    fn fresh_change_request_vetoes_approval() {
        let reviews = vec![
            review(ReviewState::Approved, Some(at(12))),
            review(ReviewState::Approved, Some(at(13))),
            review(ReviewState::ChangesRequested, Some(at(12))),
        ];
        assert!(!is_approved(&reviews, at(11)));
        assert!(is_approved(&reviews[..2], at(11)));
        assert!(!is_approved(&[review(ReviewState::Approved, None)], at(1)));
    }

    #[test]
    fn renders_table() {
        let rows = vec![
            (
                "feat.erised.packages_bar".to_string(),
                BranchStatus {
                    url: "https://x/compare".into(),
                    ..BranchStatus::default()
                },
            ),
            (
                "feat.erised.packages_foo".to_string(),
                BranchStatus {
                    url: "https://x/pull/2".into(),
                    is_local_up_to_date: true,
                    is_remote_up_to_date: true,
                    is_merged: true,
                    is_approved: true,
                },
            ),
        ];

        assert_eq!(
            render_status(&rows),
            "💻 | 🌐 | 🧐 / URL\n\
             -- | -- | --------\n\
             ⛔ | ⛔ | ⛔ / packages_bar (https://x/compare)\n\
             ✅ | ✅ | ⤴️ / packages_foo (https://x/pull/2)\n"
        );
    }
}
