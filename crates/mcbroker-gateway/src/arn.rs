//! Provider resource naming.

/// Resource name tags are attached to, e.g.
/// `arn:aws:elasticache:us-west-2:123456789012:cluster:mc-small-01`.
pub fn cluster_arn(region: &str, account_number: &str, name: &str) -> String {
    format!("arn:aws:elasticache:{region}:{account_number}:cluster:{name}")
}
