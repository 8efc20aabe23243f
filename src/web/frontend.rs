//! Embedded HTML/CSS/JS frontend for the dashboard host.
//!
//! The page is compiled into the binary as a string constant. No external
//! assets, no build tools, no CDN dependencies: charts are drawn as inline
//! SVG from the JSON chart specifications the API returns.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>chartboard</title>
<style>
:root {
  --bg: #ffffff;
  --surface: #f6f8fa;
  --border: #d0d7de;
  --text: #503D36;
  --text-muted: #6e7781;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; }
.app { max-width: 1200px; margin: 0 auto; padding: 24px; }
h1 { text-align: center; font-size: 32px; margin-bottom: 24px; }
.control { margin: 12px 0; }
.control label { display: block; margin-bottom: 4px; color: var(--text-muted); }
select { width: 100%; padding: 8px; border: 1px solid var(--border); border-radius: var(--radius); }
select:disabled { opacity: 0.5; }
.slider { display: flex; gap: 12px; align-items: center; }
.slider input { flex: 1; }
.slider .readout { min-width: 140px; text-align: right; font-variant-numeric: tabular-nums; }
.marks { display: flex; justify-content: space-between; color: var(--text-muted); font-size: 12px; }
.output { margin: 16px 0; }
.grid { display: flex; flex-wrap: wrap; gap: 12px; }
.chart { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 12px; flex: 1 1 520px; }
.chart h3 { font-size: 14px; margin-bottom: 8px; }
.chart .empty { color: var(--text-muted); padding: 40px; text-align: center; }
.legend { display: flex; flex-wrap: wrap; gap: 8px; font-size: 12px; margin-top: 6px; }
.legend span::before { content: ''; display: inline-block; width: 10px; height: 10px; margin-right: 4px; background: var(--c); }
</style>
</head>
<body>
<div class="app">
  <h1 id="title"></h1>
  <div id="controls"></div>
  <div id="outputs"></div>
</div>
<script>
const PALETTE = ['#636efa', '#ef553b', '#00cc96', '#ab63fa', '#ffa15a', '#19d3f3', '#ff6692', '#b6e880'];
let layout = null;
const values = {};

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

// ---------------------------------------------------------------------------
// Controls
// ---------------------------------------------------------------------------
function buildControl(control) {
  const wrap = document.createElement('div');
  wrap.className = 'control';
  if (control.label) {
    const label = document.createElement('label');
    label.textContent = control.label;
    wrap.appendChild(label);
  }
  values[control.id] = control.default;

  if (control.kind.type === 'dropdown') {
    const select = document.createElement('select');
    select.id = control.id;
    const placeholder = document.createElement('option');
    placeholder.value = 'null';
    placeholder.textContent = control.placeholder || '';
    select.appendChild(placeholder);
    for (const opt of control.kind.options) {
      const el = document.createElement('option');
      el.value = JSON.stringify(opt.value);
      el.textContent = opt.label;
      select.appendChild(el);
    }
    select.value = JSON.stringify(control.default);
    select.addEventListener('change', () => changed(control.id, JSON.parse(select.value)));
    wrap.appendChild(select);
  } else {
    const k = control.kind;
    const [lo, hi] = control.default || [k.min, k.max];
    const row = document.createElement('div');
    row.className = 'slider';
    const low = rangeInput(k, lo), high = rangeInput(k, hi);
    const readout = document.createElement('span');
    readout.className = 'readout';
    const update = () => {
      const a = Number(low.value), b = Number(high.value);
      readout.textContent = `${Math.min(a, b)} – ${Math.max(a, b)}`;
      changed(control.id, [Math.min(a, b), Math.max(a, b)]);
    };
    low.addEventListener('change', update);
    high.addEventListener('change', update);
    readout.textContent = `${lo} – ${hi}`;
    row.append(low, high, readout);
    wrap.appendChild(row);
    const marks = document.createElement('div');
    marks.className = 'marks';
    for (const m of k.marks) {
      const s = document.createElement('span');
      s.textContent = m.label;
      marks.appendChild(s);
    }
    wrap.appendChild(marks);
  }
  return wrap;
}

function rangeInput(k, value) {
  const input = document.createElement('input');
  input.type = 'range';
  input.min = k.min; input.max = k.max; input.step = k.step;
  input.value = value;
  return input;
}

function changed(id, value) {
  values[id] = value;
  for (const out of layout.outputs) {
    if (out.inputs.includes(id)) refresh(out);
  }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------
async function refresh(out) {
  const payload = {};
  for (const id of out.inputs) payload[id] = values[id] === undefined ? null : values[id];
  const res = await api('POST', '/api/outputs/' + out.id, { values: payload });
  if (res.error) { console.error(res.error); return; }
  const value = res.value;

  if (out.target.kind === 'control-disabled') {
    document.getElementById(out.target.control).disabled = value.value;
    return;
  }
  const region = document.getElementById('out-' + out.id);
  region.innerHTML = '';
  if (value.type === 'chart') region.appendChild(renderChart(value.value));
  if (value.type === 'charts') value.value.forEach(spec => region.appendChild(renderChart(spec)));
}

// ---------------------------------------------------------------------------
// SVG charts
// ---------------------------------------------------------------------------
const W = 520, H = 300, PAD = 44;
const NS = 'http://www.w3.org/2000/svg';

function svgEl(tag, attrs) {
  const el = document.createElementNS(NS, tag);
  for (const [k, v] of Object.entries(attrs)) el.setAttribute(k, v);
  return el;
}

function renderChart(spec) {
  const box = document.createElement('div');
  box.className = 'chart';
  const h = document.createElement('h3');
  h.textContent = spec.title;
  box.appendChild(h);
  const points = spec.traces.flatMap(t => t.points);
  if (points.length === 0) {
    const empty = document.createElement('div');
    empty.className = 'empty';
    empty.textContent = 'No data';
    box.appendChild(empty);
    return box;
  }
  const svg = svgEl('svg', { viewBox: `0 0 ${W} ${H}`, width: '100%' });
  const legend = document.createElement('div');
  legend.className = 'legend';
  if (spec.kind === 'pie') drawPie(svg, legend, points);
  else drawXY(svg, legend, spec);
  box.append(svg, legend);
  return box;
}

function legendEntry(legend, label, color) {
  const s = document.createElement('span');
  s.style.setProperty('--c', color);
  s.textContent = label;
  legend.appendChild(s);
}

function drawPie(svg, legend, points) {
  const total = points.reduce((a, p) => a + (Number(p.y) || 0), 0) || 1;
  const cx = W / 2, cy = H / 2, r = H / 2 - 10;
  let angle = -Math.PI / 2;
  points.forEach((p, i) => {
    const frac = (Number(p.y) || 0) / total;
    const color = PALETTE[i % PALETTE.length];
    const end = angle + frac * 2 * Math.PI;
    if (frac >= 0.9999) {
      svg.appendChild(svgEl('circle', { cx, cy, r, fill: color }));
    } else if (frac > 0) {
      const large = end - angle > Math.PI ? 1 : 0;
      const d = `M${cx},${cy} L${cx + r * Math.cos(angle)},${cy + r * Math.sin(angle)} ` +
        `A${r},${r} 0 ${large} 1 ${cx + r * Math.cos(end)},${cy + r * Math.sin(end)} Z`;
      svg.appendChild(svgEl('path', { d, fill: color }));
    }
    legendEntry(legend, `${p.x} (${(frac * 100).toFixed(1)}%)`, color);
    angle = end;
  });
}

function drawXY(svg, legend, spec) {
  const all = spec.traces.flatMap(t => t.points);
  const numericX = spec.kind !== 'bar' && all.every(p => typeof p.x === 'number');
  const cats = [...new Set(all.map(p => String(p.x)))];
  const xs = all.map(p => Number(p.x));
  const ys = all.map(p => Number(p.y) || 0);
  const xMin = Math.min(...xs), xMax = Math.max(...xs);
  const yMin = Math.min(0, ...ys), yMax = Math.max(...ys) || 1;
  const band = (W - 2 * PAD) / Math.max(cats.length, 1);
  const sx = p => numericX
    ? PAD + (xMax === xMin ? 0.5 : (Number(p.x) - xMin) / (xMax - xMin)) * (W - 2 * PAD)
    : PAD + band * (cats.indexOf(String(p.x)) + 0.5);
  const sy = v => H - PAD - ((v - yMin) / (yMax - yMin)) * (H - 2 * PAD);

  svg.appendChild(svgEl('line', { x1: PAD, y1: H - PAD, x2: W - PAD, y2: H - PAD, stroke: '#999' }));
  svg.appendChild(svgEl('line', { x1: PAD, y1: PAD, x2: PAD, y2: H - PAD, stroke: '#999' }));
  const yLabel = svgEl('text', { x: 4, y: PAD - 8, 'font-size': 11 });
  yLabel.textContent = `${spec.y} (max ${yMax.toLocaleString()})`;
  svg.appendChild(yLabel);
  const xLabel = svgEl('text', { x: W - PAD, y: H - 8, 'font-size': 11, 'text-anchor': 'end' });
  xLabel.textContent = numericX ? `${spec.x} (${xMin} – ${xMax})` : spec.x;
  svg.appendChild(xLabel);
  if (!numericX && cats.length <= 16) {
    cats.forEach((c, i) => {
      const t = svgEl('text', { x: PAD + band * (i + 0.5), y: H - PAD + 14, 'font-size': 10, 'text-anchor': 'middle' });
      t.textContent = c;
      svg.appendChild(t);
    });
  }

  const traces = spec.traces.length;
  spec.traces.forEach((trace, ti) => {
    const color = PALETTE[ti % PALETTE.length];
    if (trace.name !== undefined) legendEntry(legend, trace.name, color);
    if (spec.kind === 'bar') {
      const w = band / traces * 0.8;
      trace.points.forEach(p => {
        const x = sx(p) - band * 0.4 + ti * w;
        const y = sy(Number(p.y) || 0);
        svg.appendChild(svgEl('rect', { x, y, width: w, height: Math.max(sy(0) - y, 0), fill: color }));
      });
    } else if (spec.kind === 'line') {
      const d = trace.points.map((p, i) => `${i ? 'L' : 'M'}${sx(p)},${sy(Number(p.y) || 0)}`).join(' ');
      svg.appendChild(svgEl('path', { d, fill: 'none', stroke: color, 'stroke-width': 2 }));
    } else {
      trace.points.forEach(p => {
        svg.appendChild(svgEl('circle', { cx: sx(p), cy: sy(Number(p.y) || 0), r: 4, fill: color, opacity: 0.8 }));
      });
    }
  });
}

// ---------------------------------------------------------------------------
// Boot
// ---------------------------------------------------------------------------
(async function init() {
  layout = await api('GET', '/api/layout');
  document.title = layout.title;
  document.getElementById('title').textContent = layout.title;
  const controls = document.getElementById('controls');
  for (const control of layout.controls) controls.appendChild(buildControl(control));

  const outputs = document.getElementById('outputs');
  for (const out of layout.outputs) {
    if (out.target.kind !== 'control-disabled') {
      const region = document.createElement('div');
      region.id = 'out-' + out.id;
      region.className = out.target.kind === 'grid' ? 'output grid' : 'output';
      outputs.appendChild(region);
    }
    refresh(out);
  }
})();
</script>
</body>
</html>
"##;
