use base64::{Engine, engine::general_purpose};
use tos_upload::{
    Client, HttpMethod, UploadRequest, UploadTypeConfig, callback, imgopt,
};

mod test_config;
use test_config::VolcConfig;

fn get_client() -> Client {
    let conf = VolcConfig::get_conf();
    Client::builder()
        .access_key(conf.access_key)
        .secret_key(conf.secret_key)
        .endpoint(conf.endpoint)
        .region(conf.region)
        .bucket(conf.bucket)
        .build()
}

#[test]
fn presign_url_test() {
    let client = get_client();

    let signed = client
        .presign_url()
        .method(HttpMethod::Put)
        .build()
        .generate("upload/sample.toml", 600)
        .unwrap();

    let url = url::Url::parse(&signed.url).unwrap();
    assert_eq!(
        url.host_str(),
        Some("media-bucket.tos-cn-beijing.volces.com")
    );
    assert_eq!(url.path(), "/upload/sample.toml");
    let query: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
    assert_eq!(
        query.get("X-Tos-Algorithm").map(String::as_str),
        Some("TOS4-HMAC-SHA256")
    );
    assert_eq!(
        query.get("X-Tos-Expires").map(String::as_str),
        Some("600")
    );
    assert_eq!(
        query.get("X-Tos-SignedHeaders").map(String::as_str),
        Some("host")
    );
    let signature = query.get("X-Tos-Signature").unwrap();
    assert_eq!(signature.len(), 64);
    assert!(signature.bytes().all(|b| b.is_ascii_hexdigit()));
    assert!(
        query
            .get("X-Tos-Credential")
            .unwrap()
            .starts_with("AKTESTXXX/")
    );
}

#[test]
fn post_policy_form_test() {
    let client = get_client();
    let config = UploadTypeConfig::builder()
        .tos_host("https://media-bucket.tos-cn-beijing.volces.com")
        .dir("image")
        .callback_url("https://example.com/upload/callback")
        .build();
    let request = UploadRequest {
        title: Some("家庭照 1.heic".to_owned()),
        file_type: Some("image/heic".to_owned()),
        hash_id: Some("42".to_owned()),
        ..Default::default()
    };

    let form = client
        .post_policy()
        .upload_type("image")
        .config(&config)
        .request(&request)
        .build()
        .generate()
        .unwrap();

    // the POST target lives under the upload host and matches the key field
    let key = form.param("key").unwrap();
    assert!(key.starts_with("image/"));
    assert!(key.ends_with(".heic"));
    assert_eq!(
        form.url,
        format!("https://media-bucket.tos-cn-beijing.volces.com/{key}")
    );

    for field in [
        "Content-Type",
        "name",
        "x-tos-callback",
        "x-tos-callback-var",
        "x-tos-credential",
        "x-tos-algorithm",
        "x-tos-date",
        "policy",
        "x-tos-signature",
    ] {
        assert!(form.param(field).is_some(), "missing form field {field}");
    }

    // policy must base64-decode to valid JSON carrying the bucket and
    // key-prefix conditions
    let policy: serde_json::Value = serde_json::from_slice(
        &general_purpose::STANDARD
            .decode(form.param("policy").unwrap())
            .unwrap(),
    )
    .unwrap();
    let conditions = policy["conditions"].as_array().unwrap();
    assert!(conditions.contains(&serde_json::json!({ "bucket": "media-bucket" })));
    assert!(conditions.contains(&serde_json::json!(["starts-with", "$key", key])));

    // callback var carries the request context
    let vars: serde_json::Value = serde_json::from_slice(
        &general_purpose::STANDARD
            .decode(form.param("x-tos-callback-var").unwrap())
            .unwrap(),
    )
    .unwrap();
    assert_eq!(vars["x:upload_type"], "image");
    assert_eq!(vars["x:hash_id"], "42");
}

#[tokio::test]
#[ignore = "needs real credentials and network access"]
async fn head_object_test() {
    let client = get_client();
    let res = client.head_object("upload/sample.toml").await;
    match res {
        Ok(meta) => println!("res:\n{:#?}", meta),
        Err(e) => println!("{}", e),
    }
}

#[test]
fn callback_round_trip_test() {
    let config = UploadTypeConfig::builder()
        .tos_host("https://media-bucket.tos-cn-beijing.volces.com")
        .callback_url("https://example.com/upload/callback")
        .build();

    let body = "filename=image%2F20240801%2Fabc.heic&size=524288&mimeType=image%2Fheic&upload_type=image";
    let cb = callback::parse_callback_body(body).unwrap();
    assert_eq!(cb.size, 524288);

    let record = callback::extract_file(&config, &cb);
    assert_eq!(record.title, "abc.heic");
    assert_eq!(record.vendor_type, tos_upload::VENDOR_TYPE);

    // preview url for the stored heic
    let preview = imgopt::format_heic_to_jpg(&record.url);
    assert_eq!(
        preview,
        "https://media-bucket.tos-cn-beijing.volces.com/image/20240801/abc.heic?x-tos-process=image/format,jpg"
    );
}
