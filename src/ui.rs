use crate::habits::{HabitDefinition, chart_color};
use crate::models::{DaySnapshot, MonthlyStats};

pub fn render_index(
    snapshot: &DaySnapshot,
    display_date: &str,
    quote: &str,
    catalog: &[HabitDefinition],
    month: &MonthlyStats,
) -> String {
    INDEX_HTML
        .replace("{{DATE}}", &escape(display_date))
        .replace("{{QUOTE}}", &escape(quote))
        .replace("{{DONE}}", &snapshot.completed_count.to_string())
        .replace("{{TOTAL}}", &snapshot.total_count.to_string())
        .replace(
            "{{PERCENT}}",
            &format!("{:.0}", snapshot.completion_percentage),
        )
        .replace("{{MONTH_PERCENT}}", &format!("{:.0}", month.percentage))
        .replace("{{MONTH_DAYS}}", &month.days_tracked.to_string())
        .replace("{{HABITS}}", &render_habits(snapshot, catalog))
        .replace("{{HABIT_BARS}}", &render_habit_bars(catalog, month))
}

fn render_habits(snapshot: &DaySnapshot, catalog: &[HabitDefinition]) -> String {
    catalog
        .iter()
        .map(|habit| {
            let done = snapshot.habits.get(habit.id).copied().unwrap_or(false);
            format!(
                r#"      <form class="habit{done_class}" method="post" action="/toggle/{id}" data-habit="{id}" style="--habit: {color}">
        <button type="submit">
          <span class="icon">{icon}</span>
          <span class="name">{name}</span>
          <span class="desc">{description}</span>
          <span class="check">{mark}</span>
        </button>
      </form>
"#,
                done_class = if done { " done" } else { "" },
                id = escape(habit.id),
                color = escape(habit.color),
                icon = habit.icon,
                name = escape(habit.name),
                description = escape(habit.description),
                mark = if done { "✓" } else { "○" },
            )
        })
        .collect()
}

/// One horizontal bar per habit with its completion share this month.
fn render_habit_bars(catalog: &[HabitDefinition], month: &MonthlyStats) -> String {
    catalog
        .iter()
        .enumerate()
        .map(|(index, habit)| {
            let percentage = month
                .per_habit
                .get(habit.id)
                .map(|stat| stat.percentage())
                .unwrap_or(0.0);
            format!(
                r#"      <div class="habit-bar">
        <span>{icon} {name}</span>
        <div class="track"><div class="fill {color}" style="width: {percentage:.0}%"></div></div>
        <span>{percentage:.0}%</span>
      </div>
"#,
                icon = habit.icon,
                name = escape(habit.name),
                color = chart_color(index),
            )
        })
        .collect()
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --bg: #0b0f17;
      --card: rgba(255, 255, 255, 0.05);
      --ink: #f2f4f8;
      --muted: rgba(242, 244, 248, 0.5);
      --accent: #00ffc8;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(900px, 100%);
      display: grid;
      gap: 24px;
    }

    header p {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .progress {
      height: 10px;
      border-radius: 999px;
      background: var(--card);
      overflow: hidden;
    }

    .progress div {
      height: 100%;
      background: var(--accent);
      transition: width 300ms ease;
    }

    .habits {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 12px;
    }

    .habit button {
      width: 100%;
      display: grid;
      grid-template-columns: auto 1fr auto;
      align-items: center;
      gap: 4px 12px;
      padding: 14px 16px;
      border-radius: 16px;
      border: 1px solid rgba(255, 255, 255, 0.08);
      background: var(--card);
      color: inherit;
      cursor: pointer;
      text-align: left;
    }

    .habit.done button {
      border-color: var(--habit);
    }

    .habit .icon {
      grid-row: span 2;
      font-size: 1.6rem;
    }

    .habit .desc {
      grid-column: 2;
      color: var(--muted);
      font-size: 0.85rem;
    }

    .habit .check {
      grid-row: 1 / span 2;
      grid-column: 3;
      color: var(--habit);
    }

    .bars {
      display: flex;
      align-items: flex-end;
      gap: 8px;
      height: 120px;
    }

    .bars div {
      flex: 1;
      background: var(--accent);
      opacity: 0.7;
      border-radius: 6px 6px 0 0;
      min-height: 4px;
    }

    .habit-bar {
      display: grid;
      grid-template-columns: 160px 1fr 48px;
      align-items: center;
      gap: 12px;
      font-size: 0.85rem;
    }

    .habit-bar .track {
      height: 8px;
      border-radius: 999px;
      background: var(--card);
      overflow: hidden;
    }

    .habit-bar .fill {
      height: 100%;
    }

    .fill.purple { background: #a78bfa; }
    .fill.green { background: #4ade80; }
    .fill.blue { background: #60a5fa; }
    .fill.orange { background: #fb923c; }
    .fill.pink { background: #f472b6; }
    .fill.accent { background: var(--accent); }

    .labels {
      display: flex;
      gap: 8px;
      color: var(--muted);
      font-size: 0.75rem;
    }

    .labels span {
      flex: 1;
      text-align: center;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>{{DATE}}</h1>
      <p>{{QUOTE}}</p>
    </header>

    <section>
      <p><span id="done">{{DONE}}</span> of {{TOTAL}} habits completed (<span id="percent">{{PERCENT}}</span>%)</p>
      <div class="progress"><div id="bar" style="width: {{PERCENT}}%"></div></div>
    </section>

    <section class="habits">
{{HABITS}}    </section>

    <section>
      <h2>Last 7 days</h2>
      <div class="bars" id="week"></div>
      <div class="labels" id="week-labels"></div>
    </section>

    <section>
      <h2>This year</h2>
      <p>This month: {{MONTH_PERCENT}}% over {{MONTH_DAYS}} tracked days</p>
      <div class="bars" id="year"></div>
      <div class="labels">
        <span>J</span><span>F</span><span>M</span><span>A</span><span>M</span><span>J</span>
        <span>J</span><span>A</span><span>S</span><span>O</span><span>N</span><span>D</span>
      </div>
    </section>

    <section>
      <h2>Habits this month</h2>
{{HABIT_BARS}}    </section>
  </main>

  <script>
    const renderBars = (el, values) => {
      const max = Math.max(...values, 1);
      el.innerHTML = values
        .map((value) => `<div style="height: ${Math.max((value / max) * 100, 4)}%" title="${Math.round(value)}%"></div>`)
        .join('');
    };

    const loadCharts = async () => {
      const [week, year] = await Promise.all([
        fetch('/api/stats/week').then((res) => res.json()),
        fetch('/api/stats/year').then((res) => res.json()),
      ]);
      renderBars(document.getElementById('week'), week.map((day) => day.percentage));
      document.getElementById('week-labels').innerHTML = week
        .map((day) => `<span>${day.day_name}</span>`)
        .join('');
      renderBars(document.getElementById('year'), year.monthly_percentages);
    };

    const updateToday = (snapshot) => {
      document.getElementById('done').textContent = snapshot.completed_count;
      document.getElementById('percent').textContent = Math.round(snapshot.completion_percentage);
      document.getElementById('bar').style.width = `${snapshot.completion_percentage}%`;
      document.querySelectorAll('.habit').forEach((form) => {
        const done = Boolean(snapshot.habits[form.dataset.habit]);
        form.classList.toggle('done', done);
        form.querySelector('.check').textContent = done ? '✓' : '○';
      });
    };

    document.querySelectorAll('.habit').forEach((form) => {
      form.addEventListener('submit', async (event) => {
        event.preventDefault();
        const res = await fetch('/api/toggle', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ habit_id: form.dataset.habit })
        });
        if (res.ok) {
          updateToday(await res.json());
          loadCharts().catch(() => {});
        }
      });
    });

    loadCharts().catch(() => {});
  </script>
</body>
</html>
"#;
