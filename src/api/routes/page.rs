//! Dashboard Page
//!
//! Serves the single-page dashboard shell. The page is self-contained
//! HTML with inline CSS and JavaScript; all of its data comes from the
//! JSON endpoints, so everything the page shows is the same view models
//! the API tests exercise.
//!
//! - GET /

use axum::response::Html;

/// GET /
pub async fn dashboard_page() -> Html<&'static str> {
    Html(DASHBOARD_PAGE)
}

const DASHBOARD_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>San Jose Traffic Dashboard</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; background: #fafafa; color: #212121; }
  .container { max-width: 960px; margin: 0 auto; padding: 16px; }
  h1 { margin: 8px 0 16px; }
  h2 { margin: 24px 0 8px; font-size: 1.2rem; }
  .filter { margin: 12px 0; }
  .filter select { padding: 4px 8px; font-size: 1rem; }
  #error-banner { display: none; background: #ffebee; border: 1px solid #f44336; color: #b71c1c;
    padding: 8px 12px; border-radius: 4px; margin: 12px 0; }
  .table-wrap { max-height: 320px; overflow: auto; border: 1px solid #e0e0e0; background: #fff; }
  table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
  th, td { border-bottom: 1px solid #eee; padding: 4px 8px; text-align: left; white-space: nowrap; }
  th { position: sticky; top: 0; background: #f5f5f5; }
  #traffic-map { height: 420px; border: 1px solid #e0e0e0; }
  .chart-wrap { background: #fff; border: 1px solid #e0e0e0; padding: 8px; }
  .predict-form { background: #fff; border: 1px solid #e0e0e0; padding: 12px; }
  .predict-form label { display: block; margin: 8px 0 2px; font-size: 0.9rem; }
  .predict-form input { width: 160px; padding: 4px; }
  .predict-form button { margin-top: 12px; padding: 6px 16px; font-size: 1rem; cursor: pointer; }
  #predict-result { margin-top: 12px; padding: 8px 12px; border-radius: 4px; display: none; }
  #predict-result.ok { display: block; background: #e8f5e9; border: 1px solid #4caf50; color: #1b5e20; }
  #predict-result.err { display: block; background: #ffebee; border: 1px solid #f44336; color: #b71c1c; }
</style>
</head>
<body>
<div class="container">
  <h1>San Jose Traffic Dashboard</h1>
  <div id="error-banner"></div>

  <div class="filter">
    <label for="street-select">Select a Street</label>
    <select id="street-select"><option>All</option></select>
  </div>

  <h2>Traffic Data</h2>
  <div class="table-wrap"><table id="traffic-table"><thead></thead><tbody></tbody></table></div>

  <h2>Traffic Map of San Jose</h2>
  <div id="traffic-map"></div>

  <h2>Top 10 Busiest Roads by ADT</h2>
  <div class="chart-wrap"><canvas id="top-streets-chart"></canvas></div>

  <h2>Traffic Volume Over Time</h2>
  <div class="chart-wrap"><canvas id="volume-chart"></canvas></div>

  <h2>Looker Studio Dashboard</h2>
  <div id="report-embed"></div>

  <h2>Predict Traffic Volume using BigQuery ML</h2>
  <div class="predict-form">
    <label for="latitude">Enter Latitude</label>
    <input id="latitude" type="number" step="any" value="37.3382">
    <label for="longitude">Enter Longitude</label>
    <input id="longitude" type="number" step="any" value="-121.8863">
    <label for="facility-id">Enter Facility ID</label>
    <input id="facility-id" type="number" value="12345">
    <label for="intid">Enter INTID</label>
    <input id="intid" type="number" value="6789">
    <div><button id="predict-button">Predict ADT Traffic Volume</button></div>
    <div id="predict-result"></div>
  </div>
</div>

<script>
let map = null;
let markerLayer = null;
let topStreetsChart = null;
let volumeChart = null;

function showError(message) {
  const banner = document.getElementById('error-banner');
  banner.textContent = message;
  banner.style.display = 'block';
}

function clearError() {
  document.getElementById('error-banner').style.display = 'none';
}

function renderTable(table) {
  const head = document.querySelector('#traffic-table thead');
  const body = document.querySelector('#traffic-table tbody');
  head.innerHTML = '';
  body.innerHTML = '';

  const headRow = document.createElement('tr');
  for (const column of table.columns) {
    const th = document.createElement('th');
    th.textContent = column;
    headRow.appendChild(th);
  }
  head.appendChild(headRow);

  for (const row of table.rows) {
    const tr = document.createElement('tr');
    for (const cell of row) {
      const td = document.createElement('td');
      td.textContent = cell === null ? '' : cell;
      tr.appendChild(td);
    }
    body.appendChild(tr);
  }
}

function renderMap(view) {
  const container = document.getElementById('traffic-map');
  if (!view) {
    if (map) { map.remove(); map = null; }
    container.textContent = 'No locations to map.';
    return;
  }
  if (!map) {
    container.textContent = '';
    map = L.map('traffic-map');
    L.tileLayer('https://tile.openstreetmap.org/{z}/{x}/{y}.png', {
      attribution: '&copy; OpenStreetMap contributors'
    }).addTo(map);
    markerLayer = L.layerGroup().addTo(map);
  }
  map.setView([view.center.latitude, view.center.longitude], view.zoom);
  markerLayer.clearLayers();
  for (const marker of view.markers) {
    L.marker([marker.latitude, marker.longitude]).bindPopup(marker.label).addTo(markerLayer);
  }
}

function renderChart(existing, canvasId, type, view) {
  if (existing) existing.destroy();
  return new Chart(document.getElementById(canvasId), {
    type: type,
    data: {
      labels: view.labels,
      datasets: [{
        label: view.dataset.label,
        data: view.dataset.data,
        backgroundColor: view.dataset.color,
        borderColor: view.dataset.color
      }]
    },
    options: { responsive: true, plugins: { legend: { display: false } } }
  });
}

function renderStreets(streets, selected) {
  const select = document.getElementById('street-select');
  select.innerHTML = '';
  for (const street of streets) {
    const option = document.createElement('option');
    option.value = street;
    option.textContent = street;
    if (street === selected) option.selected = true;
    select.appendChild(option);
  }
}

function renderReport(report) {
  const wrap = document.getElementById('report-embed');
  if (wrap.childElementCount > 0) return;
  const frame = document.createElement('iframe');
  frame.src = report.url;
  frame.width = report.width;
  frame.height = report.height;
  frame.setAttribute('scrolling', 'yes');
  frame.style.border = 'none';
  wrap.appendChild(frame);
}

async function loadDashboard(street) {
  clearError();
  try {
    const params = street ? '?street=' + encodeURIComponent(street) : '';
    const response = await fetch('/api/v1/dashboard' + params);
    const payload = await response.json();
    if (!response.ok) {
      showError(payload.error ? payload.error.message : 'Dashboard request failed');
      return;
    }
    renderStreets(payload.streets, payload.street);
    renderTable(payload.table);
    renderMap(payload.map || null);
    topStreetsChart = renderChart(topStreetsChart, 'top-streets-chart', 'bar', payload.top_streets);
    volumeChart = renderChart(volumeChart, 'volume-chart', 'line', payload.volume_over_time);
    renderReport(payload.report);
  } catch (e) {
    showError('Dashboard request failed: ' + e);
  }
}

async function runPrediction() {
  const result = document.getElementById('predict-result');
  const button = document.getElementById('predict-button');
  result.className = '';
  button.disabled = true;
  try {
    const body = {
      latitude: parseFloat(document.getElementById('latitude').value),
      longitude: parseFloat(document.getElementById('longitude').value),
      facility_id: parseInt(document.getElementById('facility-id').value, 10),
      intid: parseInt(document.getElementById('intid').value, 10)
    };
    const response = await fetch('/api/v1/predict', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(body)
    });
    const payload = await response.json();
    if (!response.ok) {
      result.className = 'err';
      result.textContent = payload.error ? payload.error.message : 'Prediction request failed';
      return;
    }
    result.className = payload.status === 'ok' ? 'ok' : 'err';
    result.textContent = payload.message;
  } catch (e) {
    result.className = 'err';
    result.textContent = 'Error running prediction: ' + e;
  } finally {
    button.disabled = false;
  }
}

document.getElementById('street-select').addEventListener('change', (e) => {
  loadDashboard(e.target.value);
});
document.getElementById('predict-button').addEventListener('click', runPrediction);

loadDashboard(null);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wires_the_api_endpoints() {
        assert!(DASHBOARD_PAGE.contains("/api/v1/dashboard"));
        assert!(DASHBOARD_PAGE.contains("/api/v1/predict"));
    }

    #[test]
    fn test_page_carries_the_documented_defaults() {
        assert!(DASHBOARD_PAGE.contains("37.3382"));
        assert!(DASHBOARD_PAGE.contains("-121.8863"));
        assert!(DASHBOARD_PAGE.contains("12345"));
        assert!(DASHBOARD_PAGE.contains("6789"));
    }
}
