use booking_core::{
    BookingConfig, BookingOutcome, BookingStep, BookingSummary, Center, Dispatcher, SuccessView,
    Vaccine, Wizard,
};
use web_sys::console;
use yew::prelude::*;

use super::notice::{Notice, NoticeBanner};
use super::steps::{ConfirmationStep, PaymentStep, VaccineStep};
use crate::services::{
    clear_cart, load_cart, save_cart, BrowserNavigator, BrowserWallet, HttpBackend,
};
use crate::styles;

#[derive(Properties, PartialEq)]
pub struct BookingWizardProps {
    pub config: BookingConfig,
}

#[function_component(BookingWizard)]
pub fn booking_wizard(props: &BookingWizardProps) -> Html {
    use_effect_with((), |_| {
        if let Some(document) = web_sys::window().and_then(|window| window.document()) {
            if let Err(err) = styles::ensure_styles(&document) {
                console::error_1(&err);
            }
        }
        || ()
    });

    let wizard = use_state(|| Wizard::new(load_cart().unwrap_or_default()));
    let vaccines = use_state(Vec::<Vaccine>::new);
    let centers = use_state(Vec::<Center>::new);
    let loading = use_state(|| true);
    let notice = use_state(|| None::<Notice>);
    let submitting = use_state(|| false);
    let completed = use_state(|| None::<SuccessView>);

    {
        let vaccines = vaccines.clone();
        let centers = centers.clone();
        let loading = loading.clone();
        let notice = notice.clone();
        let config = props.config.clone();
        use_effect_with(props.config.api_base_url.clone(), move |_| {
            wasm_bindgen_futures::spawn_local(async move {
                let backend = HttpBackend::new(&config);
                match backend.fetch_vaccines().await {
                    Ok(list) => {
                        log::info!("loaded {} vaccines", list.len());
                        vaccines.set(list);
                    }
                    Err(err) => {
                        log::error!("loading vaccines failed: {err}");
                        notice.set(Some(Notice::error(format!("Could not load vaccines: {err}"))));
                    }
                }
                match backend.fetch_centers().await {
                    Ok(list) => centers.set(list),
                    Err(err) => {
                        log::error!("loading centers failed: {err}");
                        notice.set(Some(Notice::error(format!("Could not load centers: {err}"))));
                    }
                }
                loading.set(false);
            });
            || ()
        });
    }

    // Back from PayPal: the approval identifiers arrive in the query string.
    {
        let notice = notice.clone();
        let completed = completed.clone();
        let wizard = wizard.clone();
        let config = props.config.clone();
        use_effect_with((), move |_| {
            let search = web_sys::window()
                .and_then(|window| window.location().search().ok())
                .unwrap_or_default();
            if search.contains("PayerID") {
                wasm_bindgen_futures::spawn_local(async move {
                    let paypal = match booking_api::parse_paypal_return(&search) {
                        Ok(paypal) => paypal,
                        Err(err) => {
                            notice.set(Some(Notice::error(format!("Invalid PayPal return: {err}"))));
                            return;
                        }
                    };
                    match HttpBackend::new(&config).confirm_paypal_payment(&paypal).await {
                        Ok(()) => {
                            clear_cart();
                            wizard.set(Wizard::default());
                            notice.set(Some(Notice::success("PayPal payment confirmed")));
                            completed.set(Some(SuccessView {
                                booking_id: paypal.booking_id.unwrap_or_default(),
                                payment_id: Some(paypal.payment_id),
                            }));
                        }
                        Err(err) => {
                            log::error!("PayPal confirmation failed: {err}");
                            notice.set(Some(Notice::error(format!(
                                "Could not confirm the PayPal payment: {err}"
                            ))));
                        }
                    }
                });
            }
            || ()
        });
    }

    let on_summary_change = {
        let wizard = wizard.clone();
        Callback::from(move |summary: BookingSummary| {
            if let Err(err) = save_cart(&summary) {
                log::warn!("cart not saved: {err}");
            }
            let mut next = (*wizard).clone();
            *next.summary_mut() = summary;
            wizard.set(next);
        })
    };

    let on_next = {
        let wizard = wizard.clone();
        let notice = notice.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*wizard).clone();
            match next.next() {
                Ok(_) => {
                    notice.set(None);
                    wizard.set(next);
                }
                Err(err) => notice.set(Some(Notice::warning(err.to_string()))),
            }
        })
    };

    let on_back = {
        let wizard = wizard.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*wizard).clone();
            next.back();
            wizard.set(next);
        })
    };

    let on_submit = {
        let wizard = wizard.clone();
        let notice = notice.clone();
        let submitting = submitting.clone();
        let completed = completed.clone();
        let config = props.config.clone();
        Callback::from(move |_: MouseEvent| {
            if *submitting {
                return;
            }
            let summary = wizard.summary().clone();
            if let Err(err) = Wizard::validate_all(&summary) {
                notice.set(Some(Notice::warning(err.to_string())));
                return;
            }

            submitting.set(true);
            notice.set(None);

            let wizard = wizard.clone();
            let notice = notice.clone();
            let submitting = submitting.clone();
            let completed = completed.clone();
            let config = config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let dispatcher = Dispatcher::new(
                    HttpBackend::new(&config),
                    BrowserWallet,
                    BrowserNavigator::new(config.success_path.clone()),
                    config.clone(),
                );
                match dispatcher.submit(&summary).await {
                    Ok(BookingOutcome::Completed(view)) => {
                        clear_cart();
                        wizard.set(Wizard::default());
                        completed.set(Some(view));
                    }
                    Ok(BookingOutcome::Redirected { url }) => {
                        log::info!("left for external payment page {url}");
                    }
                    Err(err) => {
                        log::error!("submission failed: {err}");
                        notice.set(Some(Notice::error(err.to_string())));
                    }
                }
                submitting.set(false);
            });
        })
    };

    let on_restart = {
        let wizard = wizard.clone();
        let completed = completed.clone();
        let notice = notice.clone();
        Callback::from(move |_: MouseEvent| {
            clear_cart();
            wizard.set(Wizard::default());
            completed.set(None);
            notice.set(None);
        })
    };

    let on_dismiss = {
        let notice = notice.clone();
        Callback::from(move |_: ()| notice.set(None))
    };

    let banner = (*notice)
        .clone()
        .map(|notice| html! { <NoticeBanner notice={notice} on_dismiss={on_dismiss.clone()} /> })
        .unwrap_or_default();

    if let Some(view) = (*completed).clone() {
        return html! {
            <div class="booking-root">
                { banner }
                <section class="booking-success">
                    <h2>{"Booking confirmed"}</h2>
                    <p>{ format!("Booking reference: {}", view.booking_id) }</p>
                    { view.payment_id.map(|id| html! { <p>{ format!("Payment reference: {id}") }</p> }).unwrap_or_default() }
                </section>
                <footer class="booking-actions">
                    <span />
                    <button type="button" class="primary" onclick={on_restart}>{"Book another vaccination"}</button>
                </footer>
            </div>
        };
    }

    let step = wizard.step();
    let summary = wizard.summary().clone();
    let body = match step {
        BookingStep::VaccineSelection => html! {
            <VaccineStep
                vaccines={(*vaccines).clone()}
                loading={*loading}
                summary={summary}
                on_change={on_summary_change}
            />
        },
        BookingStep::Confirmation => html! {
            <ConfirmationStep
                centers={(*centers).clone()}
                summary={summary}
                on_change={on_summary_change}
            />
        },
        BookingStep::PaymentMethod => html! {
            <PaymentStep summary={summary} on_change={on_summary_change} />
        },
    };

    html! {
        <div class="booking-root">
            <ol class="booking-steps">
                {
                    for BookingStep::ALL.into_iter().map(|item| {
                        let class = classes!(
                            (item == step).then_some("is-active"),
                            (item < step).then_some("is-done"),
                        );
                        html! { <li class={class}>{ format!("{}. {}", item.index() + 1, item.title()) }</li> }
                    })
                }
            </ol>
            { banner }
            <section class="booking-body" aria-live="polite">
                <h2>{ step.title() }</h2>
                { body }
            </section>
            <footer class="booking-actions">
                <button type="button" onclick={on_back} disabled={step == BookingStep::VaccineSelection || *submitting}>
                    {"Back"}
                </button>
                {
                    if step.is_last() {
                        html! {
                            <button type="button" class="primary" onclick={on_submit} disabled={*submitting}>
                                { if *submitting { "Submitting..." } else { "Confirm booking" } }
                            </button>
                        }
                    } else {
                        html! {
                            <button type="button" class="primary" onclick={on_next}>{"Next"}</button>
                        }
                    }
                }
            </footer>
        </div>
    }
}
