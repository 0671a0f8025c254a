//! GAQL query text, one entry per report
//!
//! Each report is a tagged variant holding its query text and the window it
//! needs. Date-bounded reports use the `{{ start_date }}` and
//! `{{ end_date }}` slots.

use super::window::WindowStart;

/// A report query known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Report {
    /// Client accounts up to one level below the configured customer
    CustomerHierarchy,
    /// Geo target reference data
    GeoTargetConstants,
    /// Campaign ids and names
    Campaigns,
    /// Ad group settings
    AdGroups,
    /// Ads with their campaign
    Ads,
    /// Daily ad metrics
    AdsPerformance,
    /// Daily ad group metrics
    AdGroupsPerformance,
    /// Hourly ad group metrics
    AdGroupsHourlyPerformance,
    /// Daily campaign metrics by device
    CampaignPerformance,
    /// Hourly campaign metrics by device
    CampaignHourlyPerformance,
    /// Campaign metrics by age range and device
    CampaignPerformanceByAgeRangeAndDevice,
    /// Campaign metrics by gender and device
    CampaignPerformanceByGenderAndDevice,
    /// Campaign metrics by targeted location
    CampaignPerformanceByLocation,
    /// Metrics by the user's geographic location
    GeoPerformance,
    /// Performance Max asset group metrics
    AssetGroupPerformance,
}

/// Query text plus the slots it needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    /// GAQL text with `{{ }}` slots
    pub text: &'static str,
    /// Date window, for reports filtered on `segments.date`
    pub window: Option<WindowStart>,
}

impl Report {
    /// Every report, in catalog order
    pub const ALL: [Report; 15] = [
        Report::CustomerHierarchy,
        Report::GeoTargetConstants,
        Report::Campaigns,
        Report::AdGroups,
        Report::Ads,
        Report::AdsPerformance,
        Report::AdGroupsPerformance,
        Report::AdGroupsHourlyPerformance,
        Report::CampaignPerformance,
        Report::CampaignHourlyPerformance,
        Report::CampaignPerformanceByAgeRangeAndDevice,
        Report::CampaignPerformanceByGenderAndDevice,
        Report::CampaignPerformanceByLocation,
        Report::GeoPerformance,
        Report::AssetGroupPerformance,
    ];

    /// The template for this report
    pub fn template(self) -> QueryTemplate {
        let (text, window) = match self {
            Report::CustomerHierarchy => (CUSTOMER_HIERARCHY, None),
            Report::GeoTargetConstants => (GEO_TARGET_CONSTANTS, None),
            Report::Campaigns => (CAMPAIGNS, None),
            Report::AdGroups => (AD_GROUPS, None),
            Report::Ads => (ADS, None),
            Report::AdsPerformance => (ADS_PERFORMANCE, Some(WindowStart::Lookback)),
            Report::AdGroupsPerformance => (AD_GROUPS_PERFORMANCE, Some(WindowStart::Lookback)),
            Report::AdGroupsHourlyPerformance => {
                (AD_GROUPS_HOURLY_PERFORMANCE, Some(WindowStart::Lookback))
            }
            Report::CampaignPerformance => (CAMPAIGN_PERFORMANCE, Some(WindowStart::Lookback)),
            Report::CampaignHourlyPerformance => {
                (CAMPAIGN_HOURLY_PERFORMANCE, Some(WindowStart::Lookback))
            }
            Report::CampaignPerformanceByAgeRangeAndDevice => {
                (AGE_RANGE_AND_DEVICE, Some(WindowStart::Configured))
            }
            Report::CampaignPerformanceByGenderAndDevice => {
                (GENDER_AND_DEVICE, Some(WindowStart::Configured))
            }
            Report::CampaignPerformanceByLocation => (LOCATION, Some(WindowStart::Configured)),
            Report::GeoPerformance => (GEO_PERFORMANCE, Some(WindowStart::Configured)),
            Report::AssetGroupPerformance => {
                (ASSET_GROUP_PERFORMANCE, Some(WindowStart::Lookback))
            }
        };
        QueryTemplate { text, window }
    }
}

const CUSTOMER_HIERARCHY: &str = "
    SELECT
        customer_client.client_customer,
        customer_client.level,
        customer_client.manager,
        customer_client.descriptive_name,
        customer_client.currency_code,
        customer_client.time_zone,
        customer_client.id
    FROM customer_client
    WHERE customer_client.level <= 1
";

const GEO_TARGET_CONSTANTS: &str = "
    SELECT geo_target_constant.canonical_name, geo_target_constant.country_code,
        geo_target_constant.id, geo_target_constant.name, geo_target_constant.status,
        geo_target_constant.target_type
    FROM geo_target_constant
";

const CAMPAIGNS: &str = "
    SELECT campaign.id, campaign.name FROM campaign ORDER BY campaign.id
";

const AD_GROUPS: &str = "
    SELECT ad_group.url_custom_parameters, ad_group.type, ad_group.tracking_url_template,
        ad_group.targeting_setting.target_restrictions, ad_group.target_roas,
        ad_group.target_cpm_micros, ad_group.status, ad_group.target_cpa_micros,
        ad_group.resource_name, ad_group.percent_cpc_bid_micros, ad_group.name,
        ad_group.labels, ad_group.id, ad_group.final_url_suffix,
        ad_group.excluded_parent_asset_field_types, ad_group.effective_target_roas_source,
        ad_group.effective_target_roas, ad_group.effective_target_cpa_source,
        ad_group.effective_target_cpa_micros, ad_group.display_custom_bid_dimension,
        ad_group.cpv_bid_micros, ad_group.cpm_bid_micros, ad_group.cpc_bid_micros,
        ad_group.campaign, ad_group.base_ad_group, ad_group.ad_rotation_mode
    FROM ad_group
";

const ADS: &str = "
    SELECT ad_group_ad.ad.type, ad_group_ad.ad.resource_name, ad_group_ad.ad.name,
        ad_group_ad.ad.id, campaign.name, campaign.id
    FROM ad_group_ad
";

const ADS_PERFORMANCE: &str = "
    SELECT campaign.name, campaign.id, ad_group.name, ad_group.id, ad_group_ad.ad.name,
        ad_group_ad.ad.id, segments.date, metrics.impressions, metrics.clicks,
        metrics.cost_micros, metrics.conversions, metrics.conversions_by_conversion_date,
        metrics.conversions_value, metrics.conversions_value_by_conversion_date,
        metrics.engagements, metrics.interactions, metrics.video_views,
        metrics.video_quartile_p25_rate, metrics.video_quartile_p50_rate,
        metrics.video_quartile_p75_rate, metrics.video_quartile_p100_rate
    FROM ad_group_ad
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const AD_GROUPS_PERFORMANCE: &str = "
    SELECT campaign.name, campaign.id, ad_group.name, ad_group.id, segments.date,
        metrics.impressions, metrics.clicks, metrics.cost_micros, metrics.conversions,
        metrics.conversions_by_conversion_date, metrics.conversions_value,
        metrics.conversions_value_by_conversion_date, metrics.video_views,
        metrics.video_quartile_p100_rate
    FROM ad_group
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const AD_GROUPS_HOURLY_PERFORMANCE: &str = "
    SELECT campaign.name, campaign.id, ad_group.name, ad_group.id, segments.date,
        segments.hour, metrics.impressions, metrics.clicks, metrics.cost_micros,
        metrics.conversions, metrics.conversions_by_conversion_date, metrics.conversions_value,
        metrics.conversions_value_by_conversion_date, metrics.video_views,
        metrics.video_quartile_p100_rate
    FROM ad_group
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const CAMPAIGN_PERFORMANCE: &str = "
    SELECT campaign.name, campaign.id, campaign.status, segments.device, segments.date,
        metrics.impressions, metrics.clicks, metrics.ctr, metrics.average_cpc,
        metrics.cost_micros, metrics.conversions, metrics.conversions_by_conversion_date,
        metrics.conversions_value, metrics.conversions_value_by_conversion_date,
        metrics.video_views, metrics.video_quartile_p100_rate
    FROM campaign
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const CAMPAIGN_HOURLY_PERFORMANCE: &str = "
    SELECT campaign.name, campaign.id, campaign.status, segments.device, segments.date,
        segments.hour, metrics.impressions, metrics.clicks, metrics.ctr, metrics.average_cpc,
        metrics.cost_micros, metrics.conversions, metrics.conversions_by_conversion_date,
        metrics.conversions_value, metrics.conversions_value_by_conversion_date,
        metrics.video_views, metrics.video_quartile_p100_rate
    FROM campaign
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const AGE_RANGE_AND_DEVICE: &str = "
    SELECT ad_group_criterion.age_range.type, campaign.name, campaign.status, ad_group.name,
        segments.date, segments.device, ad_group_criterion.system_serving_status,
        ad_group_criterion.bid_modifier, metrics.clicks, metrics.impressions, metrics.ctr,
        metrics.average_cpc, metrics.cost_micros, campaign.advertising_channel_type
    FROM age_range_view
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const GENDER_AND_DEVICE: &str = "
    SELECT ad_group_criterion.gender.type, campaign.name, campaign.status, ad_group.name,
        segments.date, segments.device, ad_group_criterion.system_serving_status,
        ad_group_criterion.bid_modifier, metrics.clicks, metrics.impressions, metrics.ctr,
        metrics.average_cpc, metrics.cost_micros, campaign.advertising_channel_type
    FROM gender_view
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const LOCATION: &str = "
    SELECT campaign_criterion.location.geo_target_constant, campaign.name,
        campaign_criterion.bid_modifier, segments.date, metrics.clicks, metrics.impressions,
        metrics.ctr, metrics.average_cpc, metrics.cost_micros
    FROM location_view
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
        AND campaign_criterion.status != 'REMOVED'
";

const GEO_PERFORMANCE: &str = "
    SELECT campaign.name, campaign.status, segments.date, metrics.clicks,
        metrics.cost_micros, metrics.impressions, metrics.conversions,
        geographic_view.location_type, geographic_view.country_criterion_id
    FROM geographic_view
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
";

const ASSET_GROUP_PERFORMANCE: &str = "
    SELECT customer.id, campaign.id, campaign.name, campaign.status, asset_group.id,
        asset_group.name, asset_group.status, metrics.impressions, metrics.clicks,
        metrics.cost_micros, metrics.conversions, metrics.conversions_by_conversion_date,
        metrics.conversions_value, metrics.conversions_value_by_conversion_date,
        metrics.interactions, segments.date
    FROM asset_group
    WHERE segments.date >= {{ start_date }} AND segments.date <= {{ end_date }}
    ORDER BY segments.date
";
