//! Prompt template sources, one per name and language

pub(super) const COMPARISON_FR: &str = r#"Tu es un expert financier. Compare ces deux entreprises afin d'aider un investisseur à choisir la plus intéressante aujourd'hui. Analyse les points suivants : secteur, industrie, prix actuel, capitalisation boursière, chiffre d'affaires annuel, bénéfice net, bénéfice par action (EPS), ratio P/E, retour sur fonds propres (ROE), dette totale, flux de trésorerie libre. Donne aussi ton avis sur leur santé financière globale en utilisant des notes sur 10 que tu imagines.
{% for c in companies %}
Entreprise {{ loop.index }} : {{ c.name }} :
- Secteur : {{ c.sector }}
- Industrie : {{ c.industry }}
- Prix actuel : {{ c.price }} {{ c.currency }}
- Capitalisation boursière : {{ c.market_cap }} {{ c.currency }}
- Chiffre d'affaires annuel : {{ c.revenue }} {{ c.currency }}
- Bénéfice net : {{ c.net_income }} {{ c.currency }}
- EPS : {{ c.eps }}
- Ratio P/E : {{ c.pe }}
- ROE : {{ c.roe }}
- Dette totale : {{ c.total_debt }} {{ c.currency }}
- Flux de trésorerie libre : {{ c.free_cashflow }} {{ c.currency }}
{% endfor %}
En te basant sur ces données, indique laquelle des deux entreprises semble la plus prometteuse pour un investissement aujourd'hui et explique pourquoi, en français, de façon claire, concise et professionnelle."#;

pub(super) const COMPARISON_EN: &str = r#"You are a financial expert. Compare these two companies to help an investor pick the more attractive one today. Analyse the following points: sector, industry, current price, market capitalisation, annual revenue, net income, earnings per share (EPS), P/E ratio, return on equity (ROE), total debt, free cash flow. Also give your view of their overall financial health using scores out of 10 that you estimate yourself.
{% for c in companies %}
Company {{ loop.index }}: {{ c.name }}:
- Sector: {{ c.sector }}
- Industry: {{ c.industry }}
- Current price: {{ c.price }} {{ c.currency }}
- Market capitalisation: {{ c.market_cap }} {{ c.currency }}
- Annual revenue: {{ c.revenue }} {{ c.currency }}
- Net income: {{ c.net_income }} {{ c.currency }}
- EPS: {{ c.eps }}
- P/E ratio: {{ c.pe }}
- ROE: {{ c.roe }}
- Total debt: {{ c.total_debt }} {{ c.currency }}
- Free cash flow: {{ c.free_cashflow }} {{ c.currency }}
{% endfor %}
Based on these figures, say which of the two companies looks more promising for an investment today and explain why, in English, clearly, concisely and professionally."#;

pub(super) const FOLLOW_UP_FR: &str = r#"Tu es un expert financier. Voici les données et l'analyse précédente :

{{ previous_answer }}

Question : {{ question }}

Réponds de façon claire, concise, professionnelle en français."#;

pub(super) const FOLLOW_UP_EN: &str = r#"You are a financial expert. Here are the data and the previous analysis:

{{ previous_answer }}

Question: {{ question }}

Answer clearly, concisely and professionally in English."#;
