//! Descriptor-based discovery tests
//!
//! SSDP itself needs a real network, so these tests feed descriptor locations
//! served by a mock HTTP server straight into `Discovery::identify`.

use mockito::{Server, ServerGuard};
use rstest::rstest;
use scalar_avr::{DeviceDescription, Discovery, DiscoveryConfig};
use std::time::Duration;

const STR_DN1080: &str = include_str!("fixtures/str_dn1080.xml");
const SOUNDBAR_WITH_REMOTE: &str = include_str!("fixtures/soundbar_with_remote.xml");
const SPEAKER_MISSING_AVCONTENT: &str = include_str!("fixtures/speaker_missing_avcontent.xml");
const MEDIA_SERVER: &str = include_str!("fixtures/media_server.xml");

fn discovery() -> Discovery {
    Discovery::with_config(DiscoveryConfig::default().with_timeout(Duration::from_secs(2)))
        .expect("default discovery config is valid")
}

async fn serve(server: &mut ServerGuard, path: &str, xml: &str) -> String {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(xml)
        .create_async()
        .await;
    format!("{}{}", server.url(), path)
}

#[rstest]
#[case("str_dn1080.xml", STR_DN1080, true)]
#[case("soundbar_with_remote.xml", SOUNDBAR_WITH_REMOTE, true)]
#[case("speaker_missing_avcontent.xml", SPEAKER_MISSING_AVCONTENT, false)]
#[case("media_server.xml", MEDIA_SERVER, false)]
fn test_fixture_controllability(
    #[case] fixture: &str,
    #[case] xml: &str,
    #[case] controllable: bool,
) {
    let description = DeviceDescription::from_xml(xml).expect("fixture parses");
    assert_eq!(
        description.is_controllable(),
        controllable,
        "{} controllability",
        fixture
    );
}

#[tokio::test]
async fn test_identify_keeps_receivers_with_required_services() {
    let mut server = Server::new_async().await;
    let locations = vec![
        serve(&mut server, "/receiver.xml", STR_DN1080).await,
        serve(&mut server, "/soundbar.xml", SOUNDBAR_WITH_REMOTE).await,
        serve(&mut server, "/speaker.xml", SPEAKER_MISSING_AVCONTENT).await,
        serve(&mut server, "/nas.xml", MEDIA_SERVER).await,
    ];

    let mut devices = discovery().identify(locations).await;
    devices.sort_by(|a, b| a.id.cmp(&b.id));

    assert_eq!(devices.len(), 2);

    assert_eq!(devices[0].id, "4e2a2e");
    assert_eq!(devices[0].display_name, "STR-DN1080");
    assert_eq!(devices[0].model, "STR-DN1080");
    assert_eq!(devices[0].api_version, "1.0");
    assert_eq!(devices[0].base_url, "http://192.168.1.20:10000/sony");

    assert_eq!(devices[1].id, "7a1b2c");
    assert_eq!(devices[1].display_name, "Den Soundbar");
    assert_eq!(devices[1].api_version, "1.1");
}

#[tokio::test]
async fn test_identify_skips_unfetchable_and_malformed_descriptors() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/missing.xml")
        .with_status(404)
        .create_async()
        .await;

    let locations = vec![
        format!("{}/missing.xml", server.url()),
        serve(&mut server, "/broken.xml", "<root><device><friendlyName>x</device>").await,
        serve(&mut server, "/receiver.xml", STR_DN1080).await,
        "http://127.0.0.1:9/unreachable.xml".to_string(),
    ];

    let devices = discovery().identify(locations).await;
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "4e2a2e");
}

#[tokio::test]
async fn test_identify_deduplicates_by_device_id() {
    let mut server = Server::new_async().await;
    let renamed = STR_DN1080.replace(
        "<friendlyName>STR-DN1080</friendlyName>",
        "<friendlyName>Living Room</friendlyName>",
    );

    let first = serve(&mut server, "/eth0.xml", STR_DN1080).await;
    let second = serve(&mut server, "/wlan0.xml", &renamed).await;

    // the repeated location keeps its first position, so the second location wins
    let devices = discovery()
        .identify(vec![first.clone(), second, first])
        .await;

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "4e2a2e");
    assert_eq!(devices[0].display_name, "Living Room");
}

#[tokio::test]
async fn test_identify_nothing() {
    let devices = discovery().identify(Vec::<String>::new()).await;
    assert!(devices.is_empty());
}

#[tokio::test]
async fn test_identify_skips_descriptor_with_malformed_udn() {
    let mut server = Server::new_async().await;
    let malformed = STR_DN1080.replace(
        "uuid:5f9ec1b3-ed59-1900-4530-d8d43c4e2a2e",
        "uuid:zz4e2a2e",
    );
    let location = serve(&mut server, "/receiver.xml", &malformed).await;

    assert!(discovery().identify(vec![location]).await.is_empty());
}
