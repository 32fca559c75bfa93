//! Demo data for the customer analytics pages.
//!
//! Every run replaces the six analytics tables with freshly generated rows:
//! five touchpoints per customer, one interaction per touchpoint, a sale for
//! roughly 30% of customer/campaign pairs, and one financial metric per sale.
//! User accounts are left alone.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use super::{CliError, connect};

const TOUCHPOINTS_PER_CUSTOMER: usize = 5;
const SALE_PROBABILITY: f64 = 0.3;
const WIN_PROBABILITY: f64 = 0.3;

/// Rows per multi-row `INSERT`, well under the bind parameter limit.
const INSERT_BATCH: usize = 1000;

const DEVICE_TYPES: [&str; 3] = ["Mobile", "Desktop", "Tablet"];
const UTM_SOURCES: [&str; 3] = ["Google", "Meta", "LinkedIn"];
const UTM_MEDIUMS: [&str; 3] = ["CPC", "Display", "Email"];
const TOUCHPOINT_TYPES: [&str; 7] = [
    "Website Visit",
    "Ad Click",
    "Email Open",
    "Social Media",
    "Content Download",
    "Webinar",
    "Form Submission",
];
const TOUCHPOINT_DETAILS: [&str; 7] = [
    "Page",
    "Ad",
    "Email",
    "Post",
    "Whitepaper",
    "Webinar",
    "Demo Request",
];
const INTERACTION_TYPES: [&str; 4] = ["Click", "Impression", "Like", "Share"];
const CONVERSION_STAGES: [&str; 4] = ["Lead", "Opportunity", "Negotiation", "Closed"];

#[derive(Debug, Clone, Copy)]
pub struct SeedSize {
    pub customers: u32,
    pub campaigns: u32,
}

#[derive(Debug)]
struct NewCustomer {
    first_name: String,
    last_name: String,
    email: String,
    device_type: &'static str,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct NewCampaign {
    campaign_name: String,
    utm_source: &'static str,
    utm_medium: &'static str,
    utm_campaign: String,
    ad_keyword: String,
    creative_asset: String,
    start_date: DateTime<Utc>,
    ad_spend: Decimal,
}

#[derive(Debug)]
struct NewTouchpoint {
    customer_id: i32,
    touchpoint_type: &'static str,
    touchpoint_detail: String,
    interaction_date: DateTime<Utc>,
    device_type: &'static str,
}

/// A stored touchpoint, as returned by the insert.
#[derive(Debug, sqlx::FromRow)]
struct TouchpointRef {
    touchpoint_id: i32,
    customer_id: i32,
    interaction_date: DateTime<Utc>,
}

#[derive(Debug)]
struct NewInteraction {
    customer_id: i32,
    campaign_id: i32,
    touchpoint_id: i32,
    interaction_type: &'static str,
    interaction_value: i32,
    interaction_date: DateTime<Utc>,
}

#[derive(Debug)]
struct NewSale {
    customer_id: i32,
    campaign_id: i32,
    conversion_stage: &'static str,
    deal_size: Decimal,
    sale_date: DateTime<Utc>,
    won: bool,
}

#[derive(Debug)]
struct NewFinancial {
    customer_id: i32,
    campaign_id: i32,
    revenue: Decimal,
    cac: Decimal,
    cltv: Decimal,
    cpc: Decimal,
    cpcv: Decimal,
    acv: Decimal,
}

#[derive(Debug, Default)]
struct SeedSummary {
    customers: usize,
    campaigns: usize,
    touchpoints: usize,
    interactions: usize,
    sales: usize,
    financials: usize,
}

// =============================================================================
// Generation
// =============================================================================

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn device<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(rng, &DEVICE_TYPES)
}

fn days_ago<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, max_days: i64) -> DateTime<Utc> {
    now - Duration::days(rng.random_range(0..=max_days))
}

fn generate_customers<R: Rng + ?Sized>(rng: &mut R, count: u32, now: DateTime<Utc>) -> Vec<NewCustomer> {
    (1..=count)
        .map(|i| NewCustomer {
            first_name: format!("First{i}"),
            last_name: format!("Last{i}"),
            email: format!("user{i}@example.com"),
            device_type: device(rng),
            created_at: days_ago(rng, now, 365),
        })
        .collect()
}

fn generate_campaigns<R: Rng + ?Sized>(rng: &mut R, count: u32, now: DateTime<Utc>) -> Vec<NewCampaign> {
    (1..=count)
        .map(|i| NewCampaign {
            campaign_name: format!("Campaign{i}"),
            utm_source: pick(rng, &UTM_SOURCES),
            utm_medium: pick(rng, &UTM_MEDIUMS),
            utm_campaign: format!("Camp{i}"),
            ad_keyword: format!("keyword{}", rng.random_range(1..=50)),
            creative_asset: format!("Creative{}", rng.random_range(1..=50)),
            start_date: days_ago(rng, now, 180),
            ad_spend: Decimal::from(1000 + rng.random_range(0..=10_000)),
        })
        .collect()
}

fn generate_touchpoints<R: Rng + ?Sized>(
    rng: &mut R,
    customer_ids: &[i32],
    now: DateTime<Utc>,
) -> Vec<NewTouchpoint> {
    customer_ids
        .iter()
        .flat_map(|&id| std::iter::repeat_n(id, TOUCHPOINTS_PER_CUSTOMER))
        .map(|customer_id| NewTouchpoint {
            customer_id,
            touchpoint_type: pick(rng, &TOUCHPOINT_TYPES),
            touchpoint_detail: format!(
                "{}{}",
                pick(rng, &TOUCHPOINT_DETAILS),
                rng.random_range(1..=10)
            ),
            interaction_date: days_ago(rng, now, 365),
            device_type: device(rng),
        })
        .collect()
}

/// One interaction per touchpoint, attributed to a random campaign and
/// dated the same as its touchpoint.
fn generate_interactions<R: Rng + ?Sized>(
    rng: &mut R,
    touchpoints: &[TouchpointRef],
    campaign_ids: &[i32],
) -> Vec<NewInteraction> {
    touchpoints
        .iter()
        .filter_map(|tp| {
            let campaign_id = *campaign_ids.choose(rng)?;
            Some(NewInteraction {
                customer_id: tp.customer_id,
                campaign_id,
                touchpoint_id: tp.touchpoint_id,
                interaction_type: pick(rng, &INTERACTION_TYPES),
                interaction_value: rng.random_range(0..=100),
                interaction_date: tp.interaction_date,
            })
        })
        .collect()
}

fn generate_sales<R: Rng + ?Sized>(
    rng: &mut R,
    customer_ids: &[i32],
    campaign_ids: &[i32],
    now: DateTime<Utc>,
) -> Vec<NewSale> {
    let mut sales = Vec::new();
    for &customer_id in customer_ids {
        for &campaign_id in campaign_ids {
            if !rng.random_bool(SALE_PROBABILITY) {
                continue;
            }
            sales.push(NewSale {
                customer_id,
                campaign_id,
                conversion_stage: pick(rng, &CONVERSION_STAGES),
                deal_size: Decimal::from(1000 + rng.random_range(0..=50_000)),
                sale_date: days_ago(rng, now, 365),
                won: rng.random_bool(WIN_PROBABILITY),
            });
        }
    }
    sales
}

fn generate_financials<R: Rng + ?Sized>(rng: &mut R, sales: &[NewSale]) -> Vec<NewFinancial> {
    sales
        .iter()
        .map(|sale| NewFinancial {
            customer_id: sale.customer_id,
            campaign_id: sale.campaign_id,
            revenue: Decimal::from(5000 + rng.random_range(0..=100_000)),
            cac: Decimal::from(100 + rng.random_range(0..=1000)),
            cltv: Decimal::from(10_000 + rng.random_range(0..=50_000)),
            // 0.50 to 5.50
            cpc: Decimal::new(50 + rng.random_range(0..=500), 2),
            cpcv: Decimal::from(10 + rng.random_range(0..=100)),
            acv: Decimal::from(5000 + rng.random_range(0..=20_000)),
        })
        .collect()
}

// =============================================================================
// Storage
// =============================================================================

async fn clear(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        TRUNCATE portfolio.financial_metric,
                 portfolio.sales_metric,
                 portfolio.interaction,
                 portfolio.touchpoint,
                 portfolio.campaign,
                 portfolio.customer
        RESTART IDENTITY
        ",
    )
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_customers(
    conn: &mut PgConnection,
    rows: &[NewCustomer],
) -> Result<Vec<i32>, sqlx::Error> {
    let mut ids = Vec::with_capacity(rows.len());
    for chunk in rows.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO portfolio.customer (first_name, last_name, email, device_type, created_at) ",
        );
        qb.push_values(chunk, |mut b, c| {
            b.push_bind(c.first_name.as_str())
                .push_bind(c.last_name.as_str())
                .push_bind(c.email.as_str())
                .push_bind(c.device_type)
                .push_bind(c.created_at);
        });
        qb.push(" RETURNING customer_id");
        ids.extend(qb.build_query_scalar::<i32>().fetch_all(&mut *conn).await?);
    }
    Ok(ids)
}

async fn insert_campaigns(
    conn: &mut PgConnection,
    rows: &[NewCampaign],
) -> Result<Vec<i32>, sqlx::Error> {
    let mut ids = Vec::with_capacity(rows.len());
    for chunk in rows.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO portfolio.campaign (campaign_name, utm_source, utm_medium, utm_campaign, \
             ad_keyword, creative_asset, start_date, ad_spend) ",
        );
        qb.push_values(chunk, |mut b, c| {
            b.push_bind(c.campaign_name.as_str())
                .push_bind(c.utm_source)
                .push_bind(c.utm_medium)
                .push_bind(c.utm_campaign.as_str())
                .push_bind(c.ad_keyword.as_str())
                .push_bind(c.creative_asset.as_str())
                .push_bind(c.start_date)
                .push_bind(c.ad_spend);
        });
        qb.push(" RETURNING campaign_id");
        ids.extend(qb.build_query_scalar::<i32>().fetch_all(&mut *conn).await?);
    }
    Ok(ids)
}

async fn insert_touchpoints(
    conn: &mut PgConnection,
    rows: &[NewTouchpoint],
) -> Result<Vec<TouchpointRef>, sqlx::Error> {
    let mut stored = Vec::with_capacity(rows.len());
    for chunk in rows.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO portfolio.touchpoint (customer_id, touchpoint_type, touchpoint_detail, \
             interaction_date, device_type) ",
        );
        qb.push_values(chunk, |mut b, t| {
            b.push_bind(t.customer_id)
                .push_bind(t.touchpoint_type)
                .push_bind(t.touchpoint_detail.as_str())
                .push_bind(t.interaction_date)
                .push_bind(t.device_type);
        });
        qb.push(" RETURNING touchpoint_id, customer_id, interaction_date");
        stored.extend(
            qb.build_query_as::<TouchpointRef>()
                .fetch_all(&mut *conn)
                .await?,
        );
    }
    Ok(stored)
}

async fn insert_interactions(
    conn: &mut PgConnection,
    rows: &[NewInteraction],
) -> Result<(), sqlx::Error> {
    for chunk in rows.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO portfolio.interaction (customer_id, campaign_id, touchpoint_id, \
             interaction_type, interaction_value, interaction_date) ",
        );
        qb.push_values(chunk, |mut b, i| {
            b.push_bind(i.customer_id)
                .push_bind(i.campaign_id)
                .push_bind(i.touchpoint_id)
                .push_bind(i.interaction_type)
                .push_bind(i.interaction_value)
                .push_bind(i.interaction_date);
        });
        qb.build().execute(&mut *conn).await?;
    }
    Ok(())
}

async fn insert_sales(conn: &mut PgConnection, rows: &[NewSale]) -> Result<(), sqlx::Error> {
    for chunk in rows.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO portfolio.sales_metric (customer_id, campaign_id, conversion_stage, \
             deal_size, sale_date, won) ",
        );
        qb.push_values(chunk, |mut b, s| {
            b.push_bind(s.customer_id)
                .push_bind(s.campaign_id)
                .push_bind(s.conversion_stage)
                .push_bind(s.deal_size)
                .push_bind(s.sale_date)
                .push_bind(s.won);
        });
        qb.build().execute(&mut *conn).await?;
    }
    Ok(())
}

async fn insert_financials(
    conn: &mut PgConnection,
    rows: &[NewFinancial],
) -> Result<(), sqlx::Error> {
    for chunk in rows.chunks(INSERT_BATCH) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO portfolio.financial_metric (customer_id, campaign_id, revenue, cac, \
             cltv, cpc, cpcv, acv) ",
        );
        qb.push_values(chunk, |mut b, f| {
            b.push_bind(f.customer_id)
                .push_bind(f.campaign_id)
                .push_bind(f.revenue)
                .push_bind(f.cac)
                .push_bind(f.cltv)
                .push_bind(f.cpc)
                .push_bind(f.cpcv)
                .push_bind(f.acv);
        });
        qb.build().execute(&mut *conn).await?;
    }
    Ok(())
}

/// Replace the analytics tables with random demo data.
///
/// Runs in one transaction, so a failure leaves the previous data intact.
///
/// # Errors
///
/// Returns `CliError::InvalidSeedSize` for zero counts, or a database error.
pub async fn customers(size: SeedSize) -> Result<(), CliError> {
    if size.customers == 0 {
        return Err(CliError::InvalidSeedSize("--customers must be at least 1"));
    }
    if size.campaigns == 0 {
        return Err(CliError::InvalidSeedSize("--campaigns must be at least 1"));
    }

    let pool = connect().await?;
    let mut tx = pool.begin().await?;
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    tracing::info!("Clearing existing customer data...");
    clear(&mut tx).await?;

    let customers = generate_customers(&mut rand::rng(), size.customers, now);
    let customer_ids = insert_customers(&mut tx, &customers).await?;
    summary.customers = customer_ids.len();
    tracing::info!("Created {} customers", summary.customers);

    let campaigns = generate_campaigns(&mut rand::rng(), size.campaigns, now);
    let campaign_ids = insert_campaigns(&mut tx, &campaigns).await?;
    summary.campaigns = campaign_ids.len();
    tracing::info!("Created {} campaigns", summary.campaigns);

    let touchpoints = generate_touchpoints(&mut rand::rng(), &customer_ids, now);
    let stored_touchpoints = insert_touchpoints(&mut tx, &touchpoints).await?;
    summary.touchpoints = stored_touchpoints.len();
    tracing::info!("Created {} touchpoints", summary.touchpoints);

    let interactions = generate_interactions(&mut rand::rng(), &stored_touchpoints, &campaign_ids);
    insert_interactions(&mut tx, &interactions).await?;
    summary.interactions = interactions.len();
    tracing::info!("Created {} interactions", summary.interactions);

    let sales = generate_sales(&mut rand::rng(), &customer_ids, &campaign_ids, now);
    insert_sales(&mut tx, &sales).await?;
    summary.sales = sales.len();
    tracing::info!("Created {} sales metrics", summary.sales);

    let financials = generate_financials(&mut rand::rng(), &sales);
    insert_financials(&mut tx, &financials).await?;
    summary.financials = financials.len();
    tracing::info!("Created {} financial metrics", summary.financials);

    tx.commit().await?;

    tracing::info!(
        customers = summary.customers,
        campaigns = summary.campaigns,
        touchpoints = summary.touchpoints,
        interactions = summary.interactions,
        sales = summary.sales,
        financials = summary.financials,
        "Customer data seeded"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(416)
    }

    #[test]
    fn test_customers_are_numbered_from_one() {
        let now = Utc::now();
        let customers = generate_customers(&mut rng(), 3, now);
        assert_eq!(customers.len(), 3);
        assert_eq!(customers[0].email, "user1@example.com");
        assert_eq!(customers[2].first_name, "First3");
        assert!(customers.iter().all(|c| c.created_at <= now));
        assert!(
            customers
                .iter()
                .all(|c| ["Mobile", "Desktop", "Tablet"].contains(&c.device_type))
        );
    }

    #[test]
    fn test_device_types_parse_as_known() {
        for name in DEVICE_TYPES {
            assert!(pss_core::DeviceType::KNOWN.contains(&pss_core::DeviceType::from(name)));
        }
    }

    #[test]
    fn test_five_touchpoints_per_customer() {
        let touchpoints = generate_touchpoints(&mut rng(), &[7, 9], Utc::now());
        assert_eq!(touchpoints.len(), 2 * TOUCHPOINTS_PER_CUSTOMER);
        assert_eq!(touchpoints.iter().filter(|t| t.customer_id == 9).count(), 5);
    }

    #[test]
    fn test_interactions_follow_their_touchpoint() {
        let now = Utc::now();
        let stored = vec![TouchpointRef {
            touchpoint_id: 11,
            customer_id: 3,
            interaction_date: now,
        }];
        let interactions = generate_interactions(&mut rng(), &stored, &[1, 2]);
        assert_eq!(interactions.len(), 1);
        assert_eq!(interactions[0].touchpoint_id, 11);
        assert_eq!(interactions[0].customer_id, 3);
        assert_eq!(interactions[0].interaction_date, now);
        assert!((0..=100).contains(&interactions[0].interaction_value));
    }

    #[test]
    fn test_sales_rate_is_roughly_thirty_percent() {
        let customers: Vec<i32> = (1..=100).collect();
        let campaigns: Vec<i32> = (1..=50).collect();
        let sales = generate_sales(&mut rng(), &customers, &campaigns, Utc::now());
        // 5000 pairs; 30% is 1500
        assert!((1200..=1800).contains(&sales.len()), "got {}", sales.len());
    }

    #[test]
    fn test_one_financial_metric_per_sale() {
        let sales = generate_sales(&mut rng(), &[1, 2, 3], &[1, 2, 3, 4], Utc::now());
        let financials = generate_financials(&mut rng(), &sales);
        assert_eq!(financials.len(), sales.len());
        for f in &financials {
            assert!(f.cpc >= Decimal::new(50, 2) && f.cpc <= Decimal::new(550, 2));
            assert!(f.revenue >= Decimal::from(5000));
        }
    }
}
