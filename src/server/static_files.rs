pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>locmap</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <style>
    html, body { margin: 0; height: 100%; }
    #map { height: 100%; width: 100%; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <script src="/app.js"></script>
</body>
</html>
"#;

/// Replays a recorded `/api/session` onto Leaflet.
pub const APP_JS: &str = r#"(function () {
  const surfaces = {};
  const markers = {};

  function replay(call) {
    switch (call.op) {
      case "create_surface":
        surfaces[call.surface] = L.map(call.container);
        break;
      case "set_view":
        surfaces[call.surface].setView([call.center.lat, call.center.lng], call.zoom);
        break;
      case "add_tile_layer":
        L.tileLayer(call.url, { attribution: call.attribution }).addTo(surfaces[call.surface]);
        break;
      case "create_marker":
        markers[call.marker] = L.marker([call.at.lat, call.at.lng]);
        break;
      case "add_marker":
        markers[call.marker].addTo(surfaces[call.surface]);
        break;
      case "bind_popup":
        markers[call.marker].bindPopup(call.text);
        break;
      case "open_popup":
        markers[call.marker].openPopup();
        break;
      case "invalidate_size":
        surfaces[call.surface].invalidateSize();
        break;
      case "remove_surface":
        surfaces[call.surface].remove();
        delete surfaces[call.surface];
        break;
    }
  }

  fetch("/api/session?container=map")
    .then((r) => r.json())
    .then((session) => {
      session.calls.forEach(replay);
      window.addEventListener("resize", () => {
        Object.values(surfaces).forEach((s) => s.invalidateSize());
      });
    })
    .catch((err) => console.error("Error loading map session:", err));
})();
"#;
