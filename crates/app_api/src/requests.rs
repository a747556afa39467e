use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GetSessionsRequest {
    pub provider: String,
}

#[derive(Debug, Deserialize)]
pub struct GetSettingRequest {
    pub key: String,
    #[serde(default)]
    pub default: String,
}

#[derive(Debug, Deserialize)]
pub struct SaveSettingRequest {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseFileRequest {
    pub provider: String,
    pub path: String,
}
