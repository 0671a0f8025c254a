//! The Google Ads stream forest
//!
//! ```text
//! stream_accessible_customers
//! └── stream_customer_hierarchy
//!     └── one leaf per report
//! stream_geo_target_constant
//! ```

use super::catalog::Catalog;
use super::node::{RequestSpec, StreamNode};
use crate::config::TapConfig;
use crate::context::Context;
use crate::decode::WHOLE_BODY;
use crate::error::Result;
use crate::query::Report;
use crate::types::{JsonObject, JsonValue};

/// Root: customers reachable with the configured credentials
pub const ACCESSIBLE_CUSTOMERS: &str = "stream_accessible_customers";
/// Client accounts one level below the configured customer
pub const CUSTOMER_HIERARCHY: &str = "stream_customer_hierarchy";
/// Root: geo target reference data
pub const GEO_TARGET_CONSTANT: &str = "stream_geo_target_constant";

/// Context key the hierarchy hands to every report
pub const CUSTOMER_ID_KEY: &str = "customer_id";

/// Context key the account discovery node hands to the hierarchy
pub const RESOURCE_NAMES_KEY: &str = "resource_names";

// Only sent to API versions that still accept `pageSize`
const GEO_TARGET_PAGE_SIZE: u32 = 10_000;

/// Report leaves under the hierarchy: (name, report, primary key, schema)
const REPORT_STREAMS: &[(&str, Report, &[&str], &str)] = &[
    (
        "stream_campaign",
        Report::Campaigns,
        &["campaign__id"],
        "campaign.json",
    ),
    (
        "stream_adgroups",
        Report::AdGroups,
        &["ad_group__id", "ad_group__campaign", "ad_group__status"],
        "ad_group.json",
    ),
    (
        "stream_ads",
        Report::Ads,
        &["campaign__id", "ad_group_ad__ad__id"],
        "ad.json",
    ),
    (
        "stream_adsperformance",
        Report::AdsPerformance,
        &["campaign__id", "ad_group_ad__ad__id", "segments__date"],
        "ads_performance.json",
    ),
    (
        "stream_adgroupsperformance",
        Report::AdGroupsPerformance,
        &["campaign__id", "ad_group__id", "segments__date"],
        "adgroups_performance.json",
    ),
    (
        "stream_adgroupshourlyperformance",
        Report::AdGroupsHourlyPerformance,
        &["campaign__id", "ad_group__id", "segments__date", "segments__hour"],
        "adgroups_hourly_performance.json",
    ),
    (
        "stream_campaign_performance",
        Report::CampaignPerformance,
        &[
            "campaign__name",
            "campaign__status",
            "segments__date",
            "segments__device",
        ],
        "campaign_performance.json",
    ),
    (
        "stream_campaign_hourly_performance",
        Report::CampaignHourlyPerformance,
        &[
            "campaign__name",
            "campaign__status",
            "segments__date",
            "segments__hour",
            "segments__device",
        ],
        "campaign_hourly_performance.json",
    ),
    (
        "stream_campaign_performance_by_age_range_and_device",
        Report::CampaignPerformanceByAgeRangeAndDevice,
        &[
            "ad_group_criterion__age_range__type",
            "campaign__name",
            "segments__date",
            "campaign__status",
            "segments__device",
        ],
        "campaign_performance_by_age_range_and_device.json",
    ),
    (
        "stream_campaign_performance_by_gender_and_device",
        Report::CampaignPerformanceByGenderAndDevice,
        &[
            "ad_group_criterion__gender__type",
            "campaign__name",
            "segments__date",
            "campaign__status",
            "segments__device",
        ],
        "campaign_performance_by_gender_and_device.json",
    ),
    (
        "stream_campaign_performance_by_location",
        Report::CampaignPerformanceByLocation,
        &[
            "campaign_criterion__location__geo_target_constant",
            "campaign__name",
            "segments__date",
        ],
        "campaign_performance_by_location.json",
    ),
    (
        "stream_geo_performance",
        Report::GeoPerformance,
        &[
            "geographic_view__country_criterion_id",
            "customer_id",
            "campaign__name",
            "segments__date",
        ],
        "geo_performance.json",
    ),
    (
        "stream_asset_group_performance",
        Report::AssetGroupPerformance,
        &[
            "customer_id",
            "campaign__id",
            "asset_group__id",
            "segments__date",
        ],
        "asset_group_performance.json",
    ),
];

/// Build the catalog for one configured account
pub fn google_ads_catalog(config: &TapConfig) -> Result<Catalog> {
    let customer_id = config.customer_id.clone();
    let mut builder = Catalog::builder();

    let resource_name = format!("customers/{customer_id}");
    builder.add(
        StreamNode::new(ACCESSIBLE_CUSTOMERS, RequestSpec::AccessibleCustomers)
            .record_path(WHOLE_BODY)
            .primary_key(["resource_names"])
            .schema_ref("accessible_customers.json")
            .derive_context(move |_, _| {
                Some(Context::empty().with(RESOURCE_NAMES_KEY, vec![resource_name.clone()]))
            }),
    )?;

    builder.add(
        StreamNode::report(CUSTOMER_HIERARCHY, Report::CustomerHierarchy)
            .child_of(ACCESSIBLE_CUSTOMERS)
            .primary_key(["customer_client__id"])
            .schema_ref("customer_hierarchy.json")
            .post_process(|fields, _| (!is_manager(&fields)).then_some(fields))
            .derive_context(move |_, _| {
                Some(Context::empty().with(CUSTOMER_ID_KEY, customer_id.clone()))
            }),
    )?;

    for (name, report, key, schema) in REPORT_STREAMS {
        builder.add(
            StreamNode::report(*name, *report)
                .child_of(CUSTOMER_HIERARCHY)
                .primary_key(key.iter().copied())
                .schema_ref(*schema)
                .post_process(stamp_customer_id),
        )?;
    }

    builder.add(
        StreamNode::report(GEO_TARGET_CONSTANT, Report::GeoTargetConstants)
            .page_size(GEO_TARGET_PAGE_SIZE)
            .primary_key(["geo_target_constant__id"])
            .schema_ref("geo_target_constant.json"),
    )?;

    Ok(builder.build())
}

/// Manager accounts cannot be queried for report data
fn is_manager(fields: &JsonObject) -> bool {
    fields.get("customer_client__manager") == Some(&JsonValue::Bool(true))
}

/// Copy the account id from the context onto the record
fn stamp_customer_id(mut fields: JsonObject, context: &Context) -> Option<JsonObject> {
    if let Some(id) = context.get_str(CUSTOMER_ID_KEY) {
        fields.insert(CUSTOMER_ID_KEY.to_string(), JsonValue::String(id.to_string()));
    }
    Some(fields)
}
