//! End-to-end scenarios: descriptor dispatch through the factory and a
//! fully composed map with its chrome wiring.

use floodmap::prelude::*;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn noop_click() -> SharedClickHandler {
    Arc::new(Mutex::new(|_event: FeatureClick| {}))
}

fn composed() -> (MapHandle, crossbeam_channel::Receiver<HostEvent>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (tx, rx) = crossbeam_channel::unbounded();
    let config = MapConfig::new(Crs::Epsg28992);
    let map = compose_map(Element::div("map"), tx, &config).unwrap();
    (map, rx)
}

// ----- descriptor dispatch ------------------------------------------------

#[test]
fn test_tile_descriptor_round_trip() {
    let descriptor: LayerDescriptor = serde_json::from_str(
        r#"{ "type": "tile", "url": "https://x/{z}/{x}/{y}.png", "opacity": 0.8 }"#,
    )
    .unwrap();

    let handle = LayerFactory::with_defaults()
        .create(&descriptor, noop_click())
        .unwrap()
        .unwrap();
    match handle {
        LayerHandle::Tile(tile) => {
            assert_eq!(tile.url(), "https://x/{z}/{x}/{y}.png");
            assert_eq!(tile.opacity(), 0.8);
        }
        other => panic!("expected tile layer, got {other:?}"),
    }
}

#[test]
fn test_suppressed_descriptor_builds_nothing() {
    let descriptor: LayerDescriptor = serde_json::from_str(r#"{ "hideWms": true }"#).unwrap();

    let handle = LayerFactory::with_defaults()
        .create(&descriptor, noop_click())
        .unwrap();
    assert!(handle.is_none());
}

#[test]
fn test_untagged_descriptor_defaults_to_wms() {
    let descriptor: LayerDescriptor = serde_json::from_str(
        r#"{ "namespace": "LIWO_Operationeel", "layer": "waterdiepte" }"#,
    )
    .unwrap();

    let handle = LayerFactory::with_defaults()
        .create(&descriptor, noop_click())
        .unwrap()
        .unwrap();
    match handle {
        LayerHandle::Wms(wms) => {
            assert_eq!(wms.layer(), "waterdiepte");
            assert_eq!(
                wms.endpoint(),
                map_defaults().services.dynamic_geoserver_url
            );
        }
        other => panic!("expected wms layer, got {other:?}"),
    }
}

fn two_breach_points() -> GeoJson {
    serde_json::from_str(
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [5.1, 51.9] },
                    "properties": { "naam": "Doorbraak west" }
                },
                {
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [5.1001, 51.9001] },
                    "properties": { "naam": "Doorbraak oost" }
                }
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_clustered_breaches_aggregate_under_category_icon() {
    let descriptor = LayerDescriptor::cluster("BREACH_REGIONAL", two_breach_points());
    let mut handle = LayerFactory::with_defaults()
        .create(&descriptor, noop_click())
        .unwrap()
        .unwrap();
    let cluster = handle.as_cluster_mut().unwrap();

    let bounds = LatLngBounds::new(LatLng::new(50.0, 3.0), LatLng::new(54.0, 8.0));
    let views = cluster.clusters(&bounds, 3.0);

    assert_eq!(views.len(), 1);
    assert_eq!(views[0].count(), 2);
    let icon = views[0].icon.as_ref().unwrap();
    assert_eq!(icon.html, "<div><span>2</span></div>");
    assert!(icon.class_name.contains("BREACH_REGIONAL"));
}

// ----- composed map -------------------------------------------------------

#[test]
fn test_composition_installs_base_layers_and_chrome() {
    let (map, _rx) = composed();

    assert_eq!(
        map.base_layer_titles(),
        vec!["Kaart".to_string(), "Luchtfoto".to_string()]
    );
    assert_eq!(map.active_base_layer(), Some("Kaart".to_string()));
    // fill-window, geocoder, zoom, print, image export, layer switcher
    assert_eq!(map.control_order().len(), 6);
    assert!(map.geocoder().is_some());
    assert!(map.layer_switcher().is_some());
}

#[test]
fn test_base_layer_switch_drops_it_below_overlays() {
    let (map, _rx) = composed();

    map.set_base_layer("Luchtfoto").unwrap();
    let stack = map.render_stack();
    assert_eq!(stack[0], "base:Luchtfoto");
}

#[test]
fn test_zoom_buttons_drive_the_view() {
    let (map, _rx) = composed();
    let zoom_slot = map.control_order()[2];

    let before = map.zoom();
    map.dispatch_click(zoom_slot, "zoom-in").unwrap();
    assert_eq!(map.zoom(), before + 1.0);
    map.dispatch_click(zoom_slot, "zoom-out").unwrap();
    assert_eq!(map.zoom(), before);
}

#[test]
fn test_print_trigger_is_keyboard_reachable_and_fires_host_event() {
    let (map, rx) = composed();
    let print_slot = map.control_order()[3];

    let root = map.control_root(print_slot).unwrap();
    let trigger = root.find_by_class("leaflet-browser-print").unwrap();
    assert_eq!(trigger.attr("href"), Some("#"));

    map.dispatch_click(print_slot, "leaflet-browser-print").unwrap();
    let HostEvent::PrintStarted(job) = rx.try_recv().unwrap();
    assert_eq!(job.filename, "export");
    assert_eq!(job.mode, PrintSizeMode::Current);
}

#[test]
fn test_geocoder_toggle_expands_and_escape_restores_focus() {
    let (map, _rx) = composed();
    let geocoder_slot = map.control_order()[1];
    let geocoder = map.geocoder().unwrap();

    assert!(!geocoder.is_expanded());
    map.dispatch_click(geocoder_slot, "geocoder-toggle").unwrap();
    assert!(geocoder.is_expanded());

    map.dispatch_key(geocoder_slot, Key::Escape).unwrap();
    assert!(!geocoder.is_expanded());
    assert!(map.focused_node().is_some());
}

#[test]
fn test_geocode_result_fits_the_view() {
    let (map, _rx) = composed();

    let bbox = LatLngBounds::new(LatLng::new(51.76, 4.60), LatLng::new(51.85, 4.73));
    map.geocoder().unwrap().mark_geocode(&GeocodeResult {
        name: "Dordrecht".to_string(),
        center: bbox.center(),
        bbox,
    });

    assert_eq!(map.view_bounds(), Some(bbox));
}

#[test]
fn test_cluster_refresh_through_the_canvas() {
    let (map, _rx) = composed();
    let factory = LayerFactory::with_defaults();

    let descriptor = LayerDescriptor::cluster("BREACH_REGIONAL", two_breach_points());
    let handle = factory.create(&descriptor, noop_click()).unwrap().unwrap();
    let id = map.add_layer(handle);

    let bounds = LatLngBounds::new(LatLng::new(50.0, 3.0), LatLng::new(54.0, 8.0));
    let counts = map.with_layer_mut(&id, |layer| {
        let cluster = layer.as_cluster_mut().expect("cluster handle");
        let aggregated = cluster.clusters(&bounds, 3.0).len();
        cluster.refresh_clusters();
        let rebuilt = cluster.clusters(&bounds, 3.0).len();
        (aggregated, rebuilt)
    });
    assert_eq!(counts, Some((1, 1)));
    assert!(map.with_layer_mut("onbekend", |_| ()).is_none());
}

#[test]
fn test_escape_collapses_the_layer_switcher() {
    let (map, _rx) = composed();
    let switcher_slot = map.control_order()[5];
    let switcher = map.layer_switcher().unwrap();

    switcher.expand();
    map.dispatch_key(switcher_slot, Key::Escape).unwrap();
    assert!(switcher.is_collapsed());
}

#[test]
fn test_size_invalidation_waits_for_layout() {
    let (map, _rx) = composed();
    let start = Instant::now();

    map.run_due_tasks(start);
    assert_eq!(map.size_invalidations(), 0);

    map.run_due_tasks(start + Duration::from_millis(200));
    assert_eq!(map.size_invalidations(), 1);
}

#[test]
fn test_layer_switcher_selects_base_layers() {
    let (map, _rx) = composed();

    map.layer_switcher().unwrap().select("Luchtfoto").unwrap();
    assert_eq!(map.active_base_layer(), Some("Luchtfoto".to_string()));
    assert!(map.layer_switcher().unwrap().select("Onbekend").is_err());
}

#[test]
fn test_declared_overlays_mount_in_order_skipping_suppressed() -> anyhow::Result<()> {
    let (map, _rx) = composed();
    let factory = LayerFactory::with_defaults();

    let descriptors: Vec<LayerDescriptor> = serde_json::from_str(
        r#"[
            { "type": "tile", "url": "https://x/{z}/{x}/{y}.png", "opacity": 0.8 },
            { "hideWms": true },
            { "layerId": "dijkringen", "namespace": "LIWO_Basis", "layer": "dijkringen" }
        ]"#,
    )?;

    let ids = add_overlays(&map, &factory, &descriptors, noop_click())?;
    assert_eq!(ids.len(), 2);
    assert_eq!(map.overlay_ids(), ids);
    assert_eq!(ids[1], "dijkringen");
    Ok(())
}

#[test]
fn test_overlays_stack_above_bases_in_order() {
    let (map, _rx) = composed();

    let factory = LayerFactory::with_defaults();
    let tile = factory
        .create(&LayerDescriptor::tile("https://x/{z}/{x}/{y}.png", 0.8), noop_click())
        .unwrap()
        .unwrap();
    let id = map.add_layer(tile);

    let stack = map.render_stack();
    assert_eq!(stack.last(), Some(&id));
    map.remove_layer(&id).unwrap();
    assert!(!map.render_stack().contains(&id));
}
