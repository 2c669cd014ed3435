use booking_core::{hhmm, BookingSummary, Center, DoseSchedule, PaymentMethod, Vaccine};
use chrono::{NaiveDate, NaiveTime};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yew::TargetCast;

#[derive(Properties, PartialEq)]
pub struct VaccineStepProps {
    pub vaccines: Vec<Vaccine>,
    pub loading: bool,
    pub summary: BookingSummary,
    pub on_change: Callback<BookingSummary>,
}

#[function_component(VaccineStep)]
pub fn vaccine_step(props: &VaccineStepProps) -> Html {
    if props.loading {
        return html! { <p class="booking-empty">{"Loading vaccines..."}</p> };
    }
    if props.vaccines.is_empty() {
        return html! { <p class="booking-empty">{"No vaccines are available for booking."}</p> };
    }

    let selected_id = props.summary.vaccine.as_ref().map(|vaccine| vaccine.id.clone());

    html! {
        <div class="vaccine-grid">
            {
                for props.vaccines.iter().map(|vaccine| {
                    let is_selected = selected_id.as_deref() == Some(vaccine.id.as_str());
                    let onclick = {
                        let summary = props.summary.clone();
                        let vaccine = vaccine.clone();
                        let on_change = props.on_change.clone();
                        Callback::from(move |_: MouseEvent| {
                            let mut next = summary.clone();
                            next.select_vaccine(vaccine.clone());
                            on_change.emit(next);
                        })
                    };

                    html! {
                        <button
                            type="button"
                            class={classes!("vaccine-card", is_selected.then_some("is-selected"))}
                            aria-pressed={is_selected.to_string()}
                            onclick={onclick}
                        >
                            <strong>{ vaccine.name.clone() }</strong>
                            <span class="vaccine-meta">{ dose_label(vaccine) }</span>
                            <span class="vaccine-meta">{ format!("{} per dose", format_price(vaccine.price)) }</span>
                            { vaccine.description.as_ref().map(|text| html! { <p>{ text.clone() }</p> }).unwrap_or_default() }
                        </button>
                    }
                })
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ConfirmationStepProps {
    pub centers: Vec<Center>,
    pub summary: BookingSummary,
    pub on_change: Callback<BookingSummary>,
}

#[function_component(ConfirmationStep)]
pub fn confirmation_step(props: &ConfirmationStepProps) -> Html {
    let summary = &props.summary;

    let on_date = {
        let summary = summary.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: Event| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = summary.clone();
            next.set_first_dose_date(parse_date(&input.value()));
            on_change.emit(next);
        })
    };

    let on_time = {
        let summary = summary.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: Event| {
            let input: HtmlInputElement = event.target_unchecked_into();
            let mut next = summary.clone();
            next.set_time(parse_time(&input.value()));
            on_change.emit(next);
        })
    };

    let on_center = {
        let summary = summary.clone();
        let centers = props.centers.clone();
        let on_change = props.on_change.clone();
        Callback::from(move |event: Event| {
            let select: HtmlSelectElement = event.target_unchecked_into();
            let id = select.value();
            let mut next = summary.clone();
            next.set_center(centers.iter().find(|center| center.id == id).cloned());
            on_change.emit(next);
        })
    };

    let selected_center = summary.center.as_ref().map(|center| center.id.clone()).unwrap_or_default();
    let multi_dose = summary.vaccine.as_ref().is_some_and(Vaccine::is_multi_dose);

    html! {
        <div class="booking-confirmation">
            { summary.vaccine.as_ref().map(|vaccine| html! {
                <p>{ format!("{}: {}", vaccine.name, dose_label(vaccine)) }</p>
            }).unwrap_or_default() }
            <div class="booking-form">
                <label class="booking-field">
                    {"First dose date"}
                    <input type="date" value={format_date(summary.first_dose_date)} onchange={on_date} />
                </label>
                <label class="booking-field">
                    {"Time"}
                    <input type="time" value={format_time(summary.time)} onchange={on_time} />
                </label>
                <label class="booking-field">
                    {"Center"}
                    <select onchange={on_center}>
                        <option value="" selected={selected_center.is_empty()}>{"Select a center"}</option>
                        {
                            for props.centers.iter().map(|center| html! {
                                <option value={center.id.clone()} selected={center.id == selected_center}>
                                    { center_label(center) }
                                </option>
                            })
                        }
                    </select>
                </label>
            </div>
            {
                if multi_dose && !summary.dose_schedules.is_empty() {
                    render_dose_table(summary, &props.centers, &props.on_change)
                } else {
                    Html::default()
                }
            }
        </div>
    }
}

fn render_dose_table(
    summary: &BookingSummary,
    centers: &[Center],
    on_change: &Callback<BookingSummary>,
) -> Html {
    html! {
        <table class="dose-table">
            <thead>
                <tr>
                    <th>{"Dose"}</th>
                    <th>{"Date"}</th>
                    <th>{"Time"}</th>
                    <th>{"Center"}</th>
                </tr>
            </thead>
            <tbody>
                {
                    for summary.dose_schedules.iter().enumerate().map(|(index, dose)| {
                        let edit = |apply: fn(&mut DoseSchedule, String)| {
                            let summary = summary.clone();
                            let on_change = on_change.clone();
                            move |value: String| {
                                let mut next = summary.clone();
                                let mut dose = next.dose_schedules[index].clone();
                                apply(&mut dose, value);
                                if next.override_dose(index, dose).is_ok() {
                                    on_change.emit(next);
                                }
                            }
                        };
                        let on_date = edit(|dose, value| dose.date = parse_date(&value));
                        let on_time = edit(|dose, value| dose.time = parse_time(&value));
                        let on_center = edit(|dose, value| {
                            dose.center_id = (!value.is_empty()).then_some(value);
                        });
                        let selected_center = dose.center_id.clone().unwrap_or_default();

                        html! {
                            <tr>
                                <td>{ index + 2 }</td>
                                <td>
                                    <input
                                        type="date"
                                        value={format_date(dose.date)}
                                        onchange={Callback::from(move |event: Event| {
                                            let input: HtmlInputElement = event.target_unchecked_into();
                                            on_date(input.value());
                                        })}
                                    />
                                </td>
                                <td>
                                    <input
                                        type="time"
                                        value={format_time(dose.time)}
                                        onchange={Callback::from(move |event: Event| {
                                            let input: HtmlInputElement = event.target_unchecked_into();
                                            on_time(input.value());
                                        })}
                                    />
                                </td>
                                <td>
                                    <select onchange={Callback::from(move |event: Event| {
                                        let select: HtmlSelectElement = event.target_unchecked_into();
                                        on_center(select.value());
                                    })}>
                                        <option value="" selected={selected_center.is_empty()}>
                                            {"Same as first dose"}
                                        </option>
                                        {
                                            for centers.iter().map(|center| html! {
                                                <option value={center.id.clone()} selected={center.id == selected_center}>
                                                    { center.name.clone() }
                                                </option>
                                            })
                                        }
                                    </select>
                                </td>
                            </tr>
                        }
                    })
                }
            </tbody>
        </table>
    }
}

#[derive(Properties, PartialEq)]
pub struct PaymentStepProps {
    pub summary: BookingSummary,
    pub on_change: Callback<BookingSummary>,
}

#[function_component(PaymentStep)]
pub fn payment_step(props: &PaymentStepProps) -> Html {
    let total = props
        .summary
        .vaccine
        .as_ref()
        .map(Vaccine::course_price)
        .unwrap_or_default();

    html! {
        <div class="booking-payment">
            <div class="payment-options" role="radiogroup" aria-label="Payment method">
                {
                    for PaymentMethod::ALL.into_iter().map(|method| {
                        let is_selected = props.summary.payment == Some(method);
                        let onchange = {
                            let summary = props.summary.clone();
                            let on_change = props.on_change.clone();
                            Callback::from(move |_: Event| {
                                let mut next = summary.clone();
                                next.payment = Some(method);
                                on_change.emit(next);
                            })
                        };

                        html! {
                            <label class={classes!("payment-option", is_selected.then_some("is-selected"))}>
                                <input
                                    type="radio"
                                    name="payment-method"
                                    value={method.as_str()}
                                    checked={is_selected}
                                    onchange={onchange}
                                />
                                { method.label() }
                            </label>
                        }
                    })
                }
            </div>
            <p class="booking-total">{ format!("Total: {}", format_price(total)) }</p>
        </div>
    }
}

fn dose_label(vaccine: &Vaccine) -> String {
    if vaccine.is_multi_dose() {
        format!("{} doses, {} days apart", vaccine.dosage, vaccine.duration)
    } else {
        "Single dose".to_string()
    }
}

fn center_label(center: &Center) -> String {
    match &center.address {
        Some(address) => format!("{} ({address})", center.name),
        None => center.name.clone(),
    }
}

fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

fn parse_time(value: &str) -> Option<NaiveTime> {
    hhmm::parse(value.trim()).ok()
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_time(time: Option<NaiveTime>) -> String {
    time.map(|time| time.format("%H:%M").to_string())
        .unwrap_or_default()
}
