//! Integration tests for a full discovery-to-lead run.
//!
//! These tests drive the public pipeline API end to end:
//! 1. Admit search hits
//! 2. Fetch boards and company pages through a mock transport
//! 3. Classify, score and route
//! 4. Export the outreach lanes

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lead_engine::{
    testing::{MockSearchProvider, MockTransport},
    types::{FetchConfig, RateLimitConfig},
    BusinessType, Channel, EngineConfig, MemoryStore, Pipeline, Priority, QueryPack, RecordStore,
    RouteFlag, SearchHit, SourceType,
};
use tokio_util::sync::CancellationToken;

const ACME_BOARD: &str = r#"<html><body>
    <div id="logo"><a href="https://www.acme.io"><img alt="Acme"></a></div>
    <div class="opening"><a href="/acme/jobs/123">Founding Backend Engineer</a></div>
    <div class="opening"><a href="/acme/jobs/456">Machine Learning Engineer</a></div>
    <div class="opening"><a href="/acme/jobs/789">DevOps Engineer</a></div>
  </body></html>"#;

const ACME_HOME: &str = r#"<html><body>
    <h1>Acme</h1>
    <p>The SaaS dashboard for data teams. Public API, integrations, free trial.</p>
  </body></html>"#;

const ACME_PRICING: &str = r#"<html><body><p>Pricing: $99 per month. Sign up today.</p></body></html>"#;

const BOLT_BOARD: &str = r#"<html><body>
    <div class="main-footer"><a href="https://bolt.dev">Bolt Home Page</a></div>
    <div class="posting"><a class="posting-title" href="/bolt/1"><h5>Senior Fullstack Developer</h5></a></div>
  </body></html>"#;

const BOLT_HOME: &str = r#"<html><body>
    <p>We build custom software for clients. Our services include consulting services and MVP development.</p>
  </body></html>"#;

const BOLT_SERVICES: &str = r#"<html><body>
    <p>Development services for clients. Hire us. White label partner program. Case studies.</p>
  </body></html>"#;

const TALENT_HOME: &str = r#"<html><body>
    <p>Staffing and staff augmentation for startups. Our recruiters match candidates fast.
       Talent acquisition without the placement fee.</p>
  </body></html>"#;

fn config() -> EngineConfig {
    EngineConfig::default()
        .with_rate_limits(RateLimitConfig::new(100, Duration::from_secs(1), 60_000))
        .with_fetch(
            FetchConfig::default()
                .with_backoff_base_ms(1)
                .with_cooldown(Duration::from_secs(0))
                .with_workers(4),
        )
}

fn transport() -> MockTransport {
    MockTransport::new()
        .with_page("https://boards.greenhouse.io/acme", ACME_BOARD)
        .with_page("https://acme.io", ACME_HOME)
        .with_page("https://acme.io/pricing", ACME_PRICING)
        .with_page("https://jobs.lever.co/bolt", BOLT_BOARD)
        .with_page("https://bolt.dev", BOLT_HOME)
        .with_page("https://bolt.dev/services", BOLT_SERVICES)
        .with_page(
            "https://jobs.ashbyhq.com/talentco",
            "<html><body><p>Backend Engineer (contract)</p></body></html>",
        )
        .with_page("https://talentco.com", TALENT_HOME)
}

fn provider() -> MockSearchProvider {
    MockSearchProvider::new()
        .with_hits(
            "greenhouse founding engineer",
            vec![
                SearchHit::new("https://boards.greenhouse.io/acme/jobs/123?utm_source=x", 1)
                    .with_title("Founding Backend Engineer at Acme"),
                SearchHit::new("https://boards.greenhouse.io/acme/jobs/456", 2),
            ],
        )
        .with_hits(
            "lever fullstack",
            vec![
                SearchHit::new("https://jobs.lever.co/bolt/1", 1),
                SearchHit::new("https://jobs.ashbyhq.com/talentco/9", 2),
            ],
        )
}

fn packs() -> Vec<QueryPack> {
    vec![QueryPack::new("ats", SourceType::Hiring)
        .with_query("greenhouse founding engineer")
        .with_query("lever fullstack")]
}

async fn run() -> (Pipeline<MockTransport>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(transport(), store.clone(), config())
        .unwrap()
        .with_cache(store.clone());

    let stats = pipeline
        .run(&provider(), &packs(), &CancellationToken::new())
        .await;
    assert_eq!(stats.queries_failed, 0);
    assert_eq!(stats.fetch_failed, 0);
    assert_eq!(stats.snapshots_written, 3);

    (pipeline, store)
}

#[tokio::test]
async fn test_board_postings_collapse_to_one_target() {
    let (pipeline, _store) = run().await;

    let target = pipeline
        .ledger()
        .get("https://boards.greenhouse.io/acme")
        .expect("board root target");
    assert_eq!(target.seen_count, 2);
    assert_eq!(target.source_domain, "boards.greenhouse.io");
    assert_eq!(pipeline.ledger().len(), 3);
}

#[tokio::test]
async fn test_companies_are_classified_from_their_pages() {
    let (_pipeline, store) = run().await;

    let acme = store.get_company("acme.io").await.unwrap().unwrap();
    assert_eq!(acme.business_type, BusinessType::ProductCompany);

    let bolt = store.get_company("bolt.dev").await.unwrap().unwrap();
    assert_eq!(bolt.business_type, BusinessType::Consultancy);

    let talent = store.get_company("talentco.com").await.unwrap().unwrap();
    assert_eq!(talent.business_type, BusinessType::StaffingRecruiter);
}

#[tokio::test]
async fn test_leads_are_routed_into_lanes() {
    let (pipeline, _store) = run().await;
    let lanes = pipeline.export(Utc::now()).await.unwrap();

    assert_eq!(lanes.outreach_mvp_client.len(), 1);
    let acme = &lanes.outreach_mvp_client[0];
    assert_eq!(acme.lead.company_domain, "acme.io");
    assert_eq!(acme.lead.recommended_channel, Some(Channel::LinkedinDm));
    assert!(acme.lead.outreach_note.starts_with("Noticed you're hiring"));

    assert_eq!(lanes.outreach_partnership.len(), 1);
    let bolt = &lanes.outreach_partnership[0];
    assert_eq!(bolt.lead.company_domain, "bolt.dev");
    assert_eq!(bolt.lead.route_flag, RouteFlag::OutreachPartnership);
    assert_eq!(bolt.lead.recommended_channel, Some(Channel::PartnerIntro));

    // The staffing agency is projected but never exported.
    let leads = pipeline.project_leads(Utc::now()).await.unwrap();
    let talent = leads.iter().find(|l| l.company_domain == "talentco.com").unwrap();
    assert_eq!(talent.route_flag, RouteFlag::Ignore);
    assert_eq!(talent.priority, Priority::Low);
    assert_eq!(talent.recommended_channel, None);
}

#[tokio::test]
async fn test_projection_is_deterministic() {
    let (pipeline, _store) = run().await;
    let as_of = Utc::now();

    let first = pipeline.export(as_of).await.unwrap();
    let second = pipeline.export(as_of).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rerun_skips_unchanged_pages() {
    let (_pipeline, store) = run().await;

    let again = Pipeline::new(transport(), store.clone(), config())
        .unwrap()
        .with_cache(store.clone())
        .rehydrate()
        .await
        .unwrap();
    assert_eq!(again.ledger().len(), 3);

    let stats = again.process(&CancellationToken::new()).await;
    assert_eq!(stats.unchanged_skipped, 3);
    assert_eq!(stats.snapshots_written, 0);
    assert_eq!(store.snapshot_count(), 3);
    // Everything came from the cache.
    assert!(again.fetcher().transport().calls().is_empty());
}
