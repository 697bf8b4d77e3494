use anyhow::anyhow;
use std::env;
use std::net::SocketAddr;

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub openai_api_key: Option<String>,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub s3_bucket: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("TEACHASSIST_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| anyhow!("Invalid TEACHASSIST_BIND_ADDR format"))?;

        let database_url = env::var("DATABASE_URL").map_err(|_| anyhow!("DATABASE_URL not found"))?;

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET not found"))?;

        // The quiz generator reports a configuration error when this is absent,
        // so a missing key must not prevent startup.
        let openai_api_key = env::var("OPENAI_API_KEY").ok();

        let aws_region = env::var("AWS_REGION").map_err(|_| anyhow!("AWS_REGION not found"))?;

        let aws_access_key_id =
            env::var("AWS_ACCESS_KEY_ID").map_err(|_| anyhow!("AWS_ACCESS_KEY_ID not found"))?;

        let aws_secret_access_key = env::var("AWS_SECRET_ACCESS_KEY")
            .map_err(|_| anyhow!("AWS_SECRET_ACCESS_KEY not found"))?;

        let s3_bucket = env::var("TEACHASSIST_S3_BUCKET")
            .map_err(|_| anyhow!("TEACHASSIST_S3_BUCKET not found"))?;

        let log_level = env::var("TEACHASSIST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(AppConfig {
            bind_addr,
            database_url,
            jwt_secret,
            openai_api_key,
            aws_region,
            aws_access_key_id,
            aws_secret_access_key,
            s3_bucket,
            log_level,
        })
    }
}
