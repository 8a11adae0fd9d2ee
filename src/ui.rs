use chrono::NaiveDate;

pub fn render_index(today: NaiveDate, year: i32) -> String {
    INDEX_HTML
        .replace("{{DATE}}", &today.to_string())
        .replace("{{YEAR}}", &year.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(980px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1, h2 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      margin: 0;
    }

    h1 {
      font-size: clamp(2rem, 4vw, 2.8rem);
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f5c57;
    }

    section {
      display: grid;
      gap: 12px;
    }

    form.add {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 10px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: #5f5c57;
    }

    input, select, button {
      font: inherit;
      padding: 8px 10px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    button {
      background: var(--accent);
      color: #fff;
      border: none;
      cursor: pointer;
      font-weight: 600;
    }

    button.ghost {
      background: transparent;
      color: var(--accent-2);
      border: 1px solid rgba(47, 72, 88, 0.3);
    }

    .today li {
      display: flex;
      align-items: center;
      gap: 12px;
      padding: 8px 0;
    }

    .today ul {
      list-style: none;
      margin: 0;
      padding: 0;
    }

    .heatmap {
      display: grid;
      grid-template-rows: repeat(7, 12px);
      grid-auto-flow: column;
      grid-auto-columns: 12px;
      gap: 3px;
      overflow-x: auto;
      padding-bottom: 6px;
    }

    .cell {
      border-radius: 3px;
      background: rgba(47, 72, 88, 0.08);
    }

    .cell.scheduled {
      background: rgba(255, 107, 74, 0.12);
    }

    .cell.void {
      background: transparent;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.9rem;
    }

    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.12);
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }

    .status[data-type="error"] {
      color: #b3261e;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Habit Tracker</h1>
      <p class="subtitle">Today is <span id="today">{{DATE}}</span>. <a href="/calendar.ics">Download calendar</a></p>
      <p class="status" id="status"></p>
    </header>

    <section>
      <h2>Add a habit</h2>
      <form class="add" id="add-form">
        <label>Name <input name="name" required /></label>
        <label>Repeat
          <select name="repeat">
            <option>Daily</option>
            <option>Weekly</option>
            <option>Monthly</option>
            <option>Yearly</option>
          </select>
        </label>
        <label>Type
          <select name="type">
            <option value="Boolean">Checkbox</option>
            <option value="Percentage">Percentage</option>
          </select>
        </label>
        <label>Start <input type="date" name="start_date" value="{{DATE}}" required /></label>
        <label>End <input type="date" name="end_date" value="{{DATE}}" required /></label>
        <button type="submit">Add habit</button>
      </form>
    </section>

    <section class="today">
      <h2>Track today's habits</h2>
      <ul id="today-list"></ul>
    </section>

    <section>
      <h2>Heatmap</h2>
      <label>Habit
        <select id="heatmap-target"><option value="all">All</option></select>
      </label>
      <div class="heatmap" id="heatmap" data-year="{{YEAR}}"></div>
    </section>

    <section>
      <h2>Habit history</h2>
      <table>
        <thead><tr><th>Date</th><th>Habit</th><th>Value</th></tr></thead>
        <tbody id="history"></tbody>
      </table>
    </section>
  </main>

  <script>
    const statusEl = document.getElementById('status');
    const todayList = document.getElementById('today-list');
    const heatmapEl = document.getElementById('heatmap');
    const targetEl = document.getElementById('heatmap-target');
    const historyEl = document.getElementById('history');
    const today = document.getElementById('today').textContent;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const request = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    const escapeHtml = (text) =>
      text.replace(/[&<>"']/g, (ch) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[ch]));

    const formatValue = (entry) =>
      entry.value === null ? '-' : entry.type === 'Percentage' ? `${entry.value}%` : entry.value ? 'done' : 'missed';

    const logValue = async (id, value) => {
      await request(`/api/habits/${id}/completions`, {
        method: 'PUT',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ date: today, value })
      });
      setStatus('Saved', 'ok');
      await refresh();
    };

    const removeHabit = async (id) => {
      await request(`/api/habits/${id}`, { method: 'DELETE' });
      await refresh();
    };

    const renderToday = (data) => {
      if (!data.habits.length) {
        todayList.innerHTML = '<li>Nothing due today.</li>';
        return;
      }
      todayList.innerHTML = '';
      data.habits.forEach((entry) => {
        const li = document.createElement('li');
        const input = document.createElement('input');
        if (entry.type === 'Percentage') {
          input.type = 'range';
          input.min = 0;
          input.max = 100;
          input.value = entry.value || 0;
          input.addEventListener('change', () =>
            logValue(entry.habit_id, Number(input.value)).catch((err) => setStatus(err.message, 'error')));
        } else {
          input.type = 'checkbox';
          input.checked = entry.value === 1;
          input.addEventListener('change', () =>
            logValue(entry.habit_id, input.checked ? 1 : 0).catch((err) => setStatus(err.message, 'error')));
        }
        const name = document.createElement('span');
        name.textContent = `${entry.name} (${formatValue(entry)})`;
        const remove = document.createElement('button');
        remove.className = 'ghost';
        remove.textContent = 'Remove';
        remove.addEventListener('click', () =>
          removeHabit(entry.habit_id).catch((err) => setStatus(err.message, 'error')));
        li.append(input, name, remove);
        todayList.appendChild(li);
      });
    };

    const renderHeatmap = (grid) => {
      const cells = [];
      for (let week = 0; week < grid.rows[0].length; week += 1) {
        for (let day = 0; day < 7; day += 1) {
          cells.push(grid.rows[day][week]);
        }
      }
      const max = Math.max(1, ...cells.map((cell) => cell.value));
      heatmapEl.innerHTML = cells
        .map((cell) => {
          if (!cell.date) {
            return '<div class="cell void"></div>';
          }
          const alpha = cell.value ? 0.2 + (0.8 * cell.value) / max : 0;
          const style = alpha ? `style="background: rgba(255, 107, 74, ${alpha.toFixed(2)})"` : '';
          const cls = cell.scheduled ? 'cell scheduled' : 'cell';
          return `<div class="${cls}" ${style} title="${cell.date}: ${cell.value}"></div>`;
        })
        .join('');
    };

    const renderHistory = (rows) => {
      historyEl.innerHTML = rows
        .map((row) => `<tr><td>${row.date}</td><td>${escapeHtml(row.name)}</td><td>${formatValue(row)}</td></tr>`)
        .join('');
    };

    const renderTargets = (habits) => {
      const selected = targetEl.value;
      targetEl.innerHTML = '<option value="all">All</option>' +
        habits.map((habit) => `<option value="${habit.id}">${escapeHtml(habit.name)}</option>`).join('');
      if ([...targetEl.options].some((option) => option.value === selected)) {
        targetEl.value = selected;
      }
    };

    const loadHeatmap = async () => {
      const year = heatmapEl.dataset.year;
      renderHeatmap(await request(`/api/heatmap?habit=${targetEl.value}&year=${year}`));
    };

    const refresh = async () => {
      const [habits, todayData, history] = await Promise.all([
        request('/api/habits'),
        request('/api/today'),
        request('/api/history')
      ]);
      renderTargets(habits);
      renderToday(todayData);
      renderHistory(history);
      await loadHeatmap();
    };

    document.getElementById('add-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const form = new FormData(event.target);
      request('/api/habits', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(Object.fromEntries(form.entries()))
      })
        .then(() => {
          event.target.reset();
          setStatus('Habit added', 'ok');
          return refresh();
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    targetEl.addEventListener('change', () => loadHeatmap().catch((err) => setStatus(err.message, 'error')));

    refresh().catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_fills_placeholders() {
        let html = render_index(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), 2024);
        assert!(html.contains(r#"<span id="today">2024-03-05</span>"#));
        assert!(html.contains(r#"data-year="2024""#));
        assert!(!html.contains("{{"));
    }
}
