use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct VolcConfig {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub bucket: String,
    pub region: String,
}

impl VolcConfig {
    pub fn get_conf() -> Self {
        let file_str = std::fs::read_to_string("tests/upload/test_config/config.toml").unwrap();
        let conf = toml::from_str(&file_str).unwrap();

        conf
    }
}
