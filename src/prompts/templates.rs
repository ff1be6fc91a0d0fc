use super::names;

pub const CUSTOMER_MESSAGE: &str = "\
Write a {{ message_label }} message for {{ customer_name }} from {{ business_name }}.

Customer details:
- Name: {{ customer_name }}
- Email: {{ customer_email }}
- Phone: {{ customer_phone }}
- Last visit: {{ last_visit }}

Business details:
- Name: {{ business_name }}
- Industry: {{ industry }}

Additional context: {{ context }}

Keep the message personal, concise and ready to send.";

pub const APPOINTMENT_REMINDER: &str = "\
{{ instruction }}

Appointment details:
- Appointment: {{ appointment_title }}
- Customer: {{ customer_name }}
- Date: {{ date }}
- Time: {{ time }}
- Duration: {{ duration }}
- Service: {{ service_name }}
- Notes: {{ notes }}

Business:
- Name: {{ business_name }}
- Location: {{ location }}
- Phone: {{ business_phone }}";

pub const FINANCIAL_FORECAST: &str = "\
Create a 12-month financial forecast for this business.

Business:
- Name: {{ business_name }}
- Industry: {{ industry }}
- Description: {{ description }}
- Location: {{ location }}

Current financial data:
{{ financial_data }}";

pub const MARKETING_IDEAS: &str = "\
Suggest marketing ideas for this business.

Business:
- Name: {{ business_name }}
- Industry: {{ industry }}
- Description: {{ description }}
- Location: {{ location }}

Target audience: {{ target_audience }}
Monthly marketing budget: {{ budget }}";

pub const TASK_SUGGESTIONS: &str = "\
Here is the current state of the business:

{{ business_data }}

Suggest the tasks the owner should focus on next.";

pub const BUSINESS_PLAN: &str = "\
Write a complete business plan titled \"{{ title }}\".

Context from the owner:
{{ context }}";

pub const CONTENT_REQUEST: &str = "\
{{ prompt }}
{%- if business_name %}

Business context:
- Name: {{ business_name }}
{%- if industry %}
- Industry: {{ industry }}
{%- endif %}
{%- if description %}
- Description: {{ description }}
{%- endif %}
{%- if target_market %}
- Target market: {{ target_market }}
{%- endif %}
{%- endif %}";

pub const BUSINESS_CONTEXT: &str = "\
{%- if business_name %}
The owner runs {{ business_name }}
{%- if industry %} in the {{ industry }} industry{% endif %}.
{%- if description %} {{ description }}{% endif %}
{%- if location %} Located in {{ location }}.{% endif %}
{%- endif %}";

pub const ALL: &[(&str, &str)] = &[
    (names::CUSTOMER_MESSAGE, CUSTOMER_MESSAGE),
    (names::APPOINTMENT_REMINDER, APPOINTMENT_REMINDER),
    (names::FINANCIAL_FORECAST, FINANCIAL_FORECAST),
    (names::MARKETING_IDEAS, MARKETING_IDEAS),
    (names::TASK_SUGGESTIONS, TASK_SUGGESTIONS),
    (names::BUSINESS_PLAN, BUSINESS_PLAN),
    (names::CONTENT_REQUEST, CONTENT_REQUEST),
    (names::BUSINESS_CONTEXT, BUSINESS_CONTEXT),
];
